//! Clap derive structures for the `unistat` CLI.

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unistat -- Unifi station exporter
#[derive(Debug, Parser)]
#[command(
    name = "unistat",
    version,
    about = "Export Unifi controller station data to Prometheus or InfluxDB",
    long_about = "Polls a Unifi controller for connected stations on the watched networks\n\
        and either serves them as Prometheus metrics or pushes them to InfluxDB.\n\n\
        Settings come from (lowest to highest priority): built-in defaults, the\n\
        config file, UNISTAT_* environment variables (UNISTAT_UNIFI__ADDRESS, ...),\n\
        and command-line flags.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Args)]
pub struct GlobalOpts {
    /// Path to a TOML config file
    #[arg(long, short = 'C', global = true)]
    pub config: Option<PathBuf>,

    /// Unifi controller's address
    #[arg(long = "unifi-address", value_name = "URL", global = true)]
    pub unifi_address: Option<String>,

    /// User to connect as
    #[arg(long = "unifi-user", global = true)]
    pub unifi_user: Option<String>,

    /// Given user's password
    #[arg(long = "unifi-password", global = true)]
    pub unifi_password: Option<String>,

    /// Accept invalid TLS certificates from the controller
    #[arg(long = "unifi-insecure", short = 'k', global = true)]
    pub unifi_insecure: bool,

    /// Controller request timeout in seconds
    #[arg(long = "unifi-timeout", value_name = "SECS", global = true)]
    pub unifi_timeout: Option<u64>,

    /// Comma separated list of Unifi networks to watch
    #[arg(long = "watch-networks", value_name = "NETS", global = true)]
    pub watch_networks: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve station metrics for Prometheus to scrape
    #[command(alias = "prom")]
    Prometheus(PrometheusArgs),

    /// Push station metrics to InfluxDB on a fixed interval
    #[command(alias = "influx")]
    Influxdb(InfluxDbArgs),
}

#[derive(Debug, Args)]
pub struct PrometheusArgs {
    /// Local address on which to listen for connections [default: 0.0.0.0:8080]
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,
}

#[derive(Args)]
pub struct InfluxDbArgs {
    /// InfluxDB server's address
    #[arg(long = "influx-address", value_name = "URL")]
    pub address: Option<String>,

    /// Name of the database to write to
    #[arg(long = "influx-db", value_name = "NAME")]
    pub database: Option<String>,

    /// Seconds between syncs [default: 60]
    #[arg(long = "sync-frequency", value_name = "SECS")]
    pub sync_frequency: Option<u64>,

    /// InfluxDB user (basic auth)
    #[arg(long = "influx-user")]
    pub username: Option<String>,

    /// InfluxDB password (basic auth)
    #[arg(long = "influx-password")]
    pub password: Option<String>,
}

// ── Redacted Debug ───────────────────────────────────────────────────

fn redact(secret: Option<&String>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

impl fmt::Debug for GlobalOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalOpts")
            .field("config", &self.config)
            .field("unifi_address", &self.unifi_address)
            .field("unifi_user", &self.unifi_user)
            .field("unifi_password", &redact(self.unifi_password.as_ref()))
            .field("unifi_insecure", &self.unifi_insecure)
            .field("unifi_timeout", &self.unifi_timeout)
            .field("watch_networks", &self.watch_networks)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl fmt::Debug for InfluxDbArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxDbArgs")
            .field("address", &self.address)
            .field("database", &self.database)
            .field("sync_frequency", &self.sync_frequency)
            .field("username", &self.username)
            .field("password", &redact(self.password.as_ref()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_influx_invocation() {
        let cli = Cli::try_parse_from([
            "unistat",
            "--unifi-address",
            "unifi.lan",
            "--watch-networks",
            "LAN,IoT",
            "influxdb",
            "--influx-address",
            "http://influx:8086",
            "--influx-db",
            "unifi",
            "--sync-frequency",
            "30",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(cli.global.watch_networks.as_deref(), Some("LAN,IoT"));
        match cli.command {
            Command::Influxdb(args) => {
                assert_eq!(args.database.as_deref(), Some("unifi"));
                assert_eq!(args.sync_frequency, Some(30));
            }
            Command::Prometheus(_) => panic!("expected influxdb subcommand"),
        }
    }

    #[test]
    fn debug_output_hides_passwords() {
        let cli = Cli::try_parse_from([
            "unistat",
            "--unifi-password",
            "CONTROLLER-SECRET",
            "influxdb",
            "--influx-user",
            "writer",
            "--influx-password",
            "TOPSECRET",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let rendered = format!("{cli:?}");

        assert!(!rendered.contains("TOPSECRET"), "{rendered}");
        assert!(!rendered.contains("CONTROLLER-SECRET"), "{rendered}");
        assert!(rendered.contains("[REDACTED]"), "{rendered}");
        assert!(rendered.contains("writer"), "{rendered}");
    }
}
