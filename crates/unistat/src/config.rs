//! CLI configuration: thin wrapper around `unistat_config`.
//!
//! Flags the operator passed are serialized into an overrides layer that
//! sits on top of defaults, the config file, and `UNISTAT_*` env vars.
//! Unset flags are skipped so they never shadow lower layers.

use serde::Serialize;

use unistat_config::Config;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[derive(Debug, Default, Serialize)]
struct Overrides<'a> {
    #[serde(skip_serializing_if = "UnifiOverrides::is_empty")]
    unifi: UnifiOverrides<'a>,

    #[serde(skip_serializing_if = "Option::is_none")]
    watch_networks: Option<&'a str>,

    #[serde(skip_serializing_if = "PrometheusOverrides::is_empty")]
    prometheus: PrometheusOverrides<'a>,

    #[serde(skip_serializing_if = "InfluxOverrides::is_empty")]
    influxdb: InfluxOverrides<'a>,
}

#[derive(Debug, Default, Serialize)]
struct UnifiOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

impl UnifiOverrides<'_> {
    fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.user.is_none()
            && self.password.is_none()
            && self.insecure.is_none()
            && self.timeout.is_none()
    }
}

#[derive(Debug, Default, Serialize)]
struct PrometheusOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    listen: Option<&'a str>,
}

impl PrometheusOverrides<'_> {
    fn is_empty(&self) -> bool {
        self.listen.is_none()
    }
}

#[derive(Debug, Default, Serialize)]
struct InfluxOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_frequency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

impl InfluxOverrides<'_> {
    fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.database.is_none()
            && self.sync_frequency.is_none()
            && self.username.is_none()
            && self.password.is_none()
    }
}

fn overrides(cli: &Cli) -> Overrides<'_> {
    let global = &cli.global;
    let mut overrides = Overrides {
        unifi: UnifiOverrides {
            address: global.unifi_address.as_deref(),
            user: global.unifi_user.as_deref(),
            password: global.unifi_password.as_deref(),
            insecure: global.unifi_insecure.then_some(true),
            timeout: global.unifi_timeout,
        },
        watch_networks: global.watch_networks.as_deref(),
        ..Overrides::default()
    };

    match &cli.command {
        Command::Prometheus(args) => {
            overrides.prometheus.listen = args.listen.as_deref();
        }
        Command::Influxdb(args) => {
            overrides.influxdb = InfluxOverrides {
                address: args.address.as_deref(),
                database: args.database.as_deref(),
                sync_frequency: args.sync_frequency,
                username: args.username.as_deref(),
                password: args.password.as_deref(),
            };
        }
    }

    overrides
}

/// Load the merged configuration for this invocation.
pub fn load(cli: &Cli) -> Result<Config, CliError> {
    let config = unistat_config::load_config(cli.global.config.as_deref(), &overrides(cli))?;
    Ok(config)
}
