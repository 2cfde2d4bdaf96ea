//! Layered configuration for unistat.
//!
//! Built-in defaults, an optional TOML file, `UNISTAT_*` environment
//! variables, and finally command-line overrides are merged with `figment`,
//! then validated and translated into the runtime types `unistat-api` and
//! `unistat-core` consume. Neither of those crates ever reads configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use unistat_api::{Credentials, SessionClient, TlsMode, TransportConfig};
use unistat_core::{InfluxConfig, WatchSet};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {field}")]
    Missing { field: &'static str },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration, as merged from every layer.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub unifi: UnifiConfig,

    /// Networks whose stations are reported. A TOML list or a
    /// comma-separated string.
    #[serde(default, deserialize_with = "csv_or_list")]
    pub watch_networks: Vec<String>,

    #[serde(default)]
    pub prometheus: PrometheusConfig,

    #[serde(default)]
    pub influxdb: InfluxDbConfig,
}

/// Controller connection.
#[derive(Debug, Deserialize, Serialize)]
pub struct UnifiConfig {
    /// Controller address, e.g. "https://unifi.lan:8443" or "unifi.lan:8443".
    pub address: Option<String>,

    pub user: Option<String>,

    /// Plaintext in the file; wrapped in a `SecretString` once resolved.
    pub password: Option<String>,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for UnifiConfig {
    fn default() -> Self {
        Self {
            address: None,
            user: None,
            password: None,
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PrometheusConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InfluxDbConfig {
    pub address: Option<String>,

    pub database: Option<String>,

    /// Seconds between syncs.
    #[serde(default = "default_sync_frequency")]
    pub sync_frequency: u64,

    pub username: Option<String>,

    pub password: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for InfluxDbConfig {
    fn default() -> Self {
        Self {
            address: None,
            database: None,
            sync_frequency: default_sync_frequency(),
            username: None,
            password: None,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_sync_frequency() -> u64 {
    60
}

fn csv_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Networks {
        Csv(String),
        List(Vec<String>),
    }

    let names = match Networks::deserialize(deserializer)? {
        Networks::Csv(s) => s.split(',').map(str::to_owned).collect(),
        Networks::List(list) => list,
    };
    Ok(names
        .into_iter()
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .collect())
}

// ── Resolved settings ───────────────────────────────────────────────

/// Everything needed to build a `SessionClient`.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub url: Url,
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

/// Push-mode settings.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub influx: InfluxConfig,
    pub interval: Duration,
}

impl Config {
    /// Controller address, credentials, and transport.
    pub fn controller(&self) -> Result<ControllerSettings, ConfigError> {
        let address = required(self.unifi.address.as_deref(), "unifi.address")?;
        let user = required(self.unifi.user.as_deref(), "unifi.user")?;
        let password = required(self.unifi.password.as_deref(), "unifi.password")?;

        let url = SessionClient::parse_address(address).map_err(|e| ConfigError::Validation {
            field: "unifi.address",
            reason: format!("{e}: {address}"),
        })?;

        let transport = TransportConfig::default()
            .with_tls(TlsMode::from_insecure(self.unifi.insecure))
            .with_timeout(positive_secs(self.unifi.timeout, "unifi.timeout")?);

        Ok(ControllerSettings {
            url,
            credentials: Credentials::new(user, SecretString::from(password.to_owned())),
            transport,
        })
    }

    /// The watched networks. At least one is required.
    pub fn watch_set(&self) -> Result<WatchSet, ConfigError> {
        let watch = WatchSet::new(self.watch_networks.iter().map(String::as_str));
        if watch.is_empty() {
            return Err(ConfigError::Missing {
                field: "watch_networks",
            });
        }
        Ok(watch)
    }

    /// Pull-mode listen address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.prometheus
            .listen
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "prometheus.listen",
                reason: format!("{e}: {}", self.prometheus.listen),
            })
    }

    /// Push-mode backend and cadence.
    pub fn sync(&self) -> Result<SyncSettings, ConfigError> {
        let address = required(self.influxdb.address.as_deref(), "influxdb.address")?;
        let database = required(self.influxdb.database.as_deref(), "influxdb.database")?;

        let url = if address.contains("://") {
            Url::parse(address)
        } else {
            Url::parse(&format!("http://{address}"))
        }
        .map_err(|e| ConfigError::Validation {
            field: "influxdb.address",
            reason: format!("{e}: {address}"),
        })?;

        Ok(SyncSettings {
            influx: InfluxConfig {
                url,
                database: database.to_owned(),
                username: self.influxdb.username.clone(),
                password: self.influxdb.password.clone().map(SecretString::from),
                timeout: positive_secs(self.influxdb.timeout, "influxdb.timeout")?,
            },
            interval: positive_secs(self.influxdb.sync_frequency, "influxdb.sync_frequency")?,
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing { field })
}

fn positive_secs(secs: u64, field: &'static str) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "unistat", "unistat").map_or_else(
        || PathBuf::from("unistat.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

fn file_layers(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// Defaults, then the TOML file (if present), then `UNISTAT_*` env vars.
///
/// Nested keys use a double underscore: `UNISTAT_UNIFI__ADDRESS`.
pub fn figment(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    file_layers(&path).merge(Env::prefixed("UNISTAT_").split("__"))
}

/// Load the full config with `overrides` (typically CLI flags) on top.
///
/// `overrides` should skip unset values when serialized, so only flags the
/// operator actually passed shadow the lower layers.
pub fn load_config(path: Option<&Path>, overrides: &impl Serialize) -> Result<Config, ConfigError> {
    let config = figment(path)
        .merge(Serialized::defaults(overrides))
        .extract()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn from_toml(toml: &str) -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        file.write_all(toml.as_bytes()).unwrap_or_else(|e| panic!("{e}"));
        file_layers(file.path())
            .extract()
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn defaults_apply_without_file() {
        let config: Config = file_layers(Path::new("/nonexistent/unistat.toml"))
            .extract()
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(config.prometheus.listen, "0.0.0.0:8080");
        assert_eq!(config.influxdb.sync_frequency, 60);
        assert_eq!(config.unifi.timeout, 5);
        assert!(!config.unifi.insecure);
    }

    #[test]
    fn reads_full_file() {
        let config = from_toml(
            r#"
            watch_networks = ["LAN", "IoT"]

            [unifi]
            address = "unifi.lan:8443"
            user = "metrics"
            password = "s3cret"
            insecure = true

            [influxdb]
            address = "influx.lan:8086"
            database = "unifi"
            sync_frequency = 30
            "#,
        );

        let controller = config.controller().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(controller.url.as_str(), "https://unifi.lan:8443/");
        assert_eq!(controller.credentials.username, "metrics");
        assert_eq!(controller.transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(controller.transport.timeout, Duration::from_secs(5));

        let sync = config.sync().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(sync.influx.url.as_str(), "http://influx.lan:8086/");
        assert_eq!(sync.influx.database, "unifi");
        assert_eq!(sync.interval, Duration::from_secs(30));

        assert_eq!(config.watch_set().unwrap_or_else(|e| panic!("{e}")).sorted(), ["IoT", "LAN"]);
    }

    #[test]
    fn watch_networks_accepts_csv_string() {
        let config = from_toml(r#"watch_networks = "LAN, IoT,,""#);
        assert_eq!(config.watch_networks, ["LAN", "IoT"]);
    }

    #[test]
    fn missing_fields_are_named() {
        let config = from_toml("watch_networks = []");

        assert!(matches!(
            config.controller(),
            Err(ConfigError::Missing { field: "unifi.address" })
        ));
        assert!(matches!(
            config.watch_set(),
            Err(ConfigError::Missing { field: "watch_networks" })
        ));
        assert!(matches!(
            config.sync(),
            Err(ConfigError::Missing { field: "influxdb.address" })
        ));
    }

    #[test]
    fn zero_sync_frequency_is_rejected() {
        let config = from_toml(
            r#"
            [influxdb]
            address = "http://influx:8086"
            database = "unifi"
            sync_frequency = 0
            "#,
        );

        assert!(matches!(
            config.sync(),
            Err(ConfigError::Validation { field: "influxdb.sync_frequency", .. })
        ));
    }

    #[test]
    fn bad_listen_address_is_rejected() {
        let config = from_toml("[prometheus]\nlisten = \"not-an-address\"");
        assert!(matches!(
            config.listen_addr(),
            Err(ConfigError::Validation { field: "prometheus.listen", .. })
        ));
    }

    #[test]
    fn overrides_beat_file() {
        #[derive(Serialize)]
        struct Flags {
            unifi: UnifiFlags,
        }
        #[derive(Serialize)]
        struct UnifiFlags {
            address: &'static str,
        }

        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        file.write_all(b"[unifi]\naddress = \"from-file\"\nuser = \"u\"")
            .unwrap_or_else(|e| panic!("{e}"));

        let config: Config = file_layers(file.path())
            .merge(Serialized::defaults(Flags {
                unifi: UnifiFlags {
                    address: "from-flag",
                },
            }))
            .extract()
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(config.unifi.address.as_deref(), Some("from-flag"));
        assert_eq!(config.unifi.user.as_deref(), Some("u"));
    }
}
