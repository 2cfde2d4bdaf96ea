//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `CoreError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use unistat_config::ConfigError;
use unistat_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const BUDGET_EXHAUSTED: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required setting '{field}'")]
    #[diagnostic(
        code(unistat::missing_setting),
        help(
            "Set it in the config file, via the matching UNISTAT_* environment\n\
             variable, or with the corresponding command-line flag.\n\
             Config file: {path}"
        )
    )]
    MissingSetting { field: &'static str, path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unistat::validation))]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    #[diagnostic(code(unistat::config))]
    Config(Box<figment::Error>),

    // ── Controller ───────────────────────────────────────────────────
    #[error("Authentication against {url} failed")]
    #[diagnostic(
        code(unistat::auth_failed),
        help(
            "Verify the controller address and the configured user's credentials.\n\
             If the controller uses a self-signed certificate, pass --unifi-insecure (-k)."
        )
    )]
    AuthFailed {
        url: String,
        #[source]
        source: unistat_api::Error,
    },

    #[error("Could not reach controller at {url}")]
    #[diagnostic(
        code(unistat::connection_failed),
        help("Check that the controller is running and accessible.")
    )]
    ControllerUnreachable {
        url: String,
        #[source]
        source: unistat_api::Error,
    },

    // ── Backends ─────────────────────────────────────────────────────
    #[error("InfluxDB at {url} is not available")]
    #[diagnostic(
        code(unistat::influx_unavailable),
        help("Check --influx-address and that the InfluxDB server answers /ping.")
    )]
    InfluxUnavailable {
        url: String,
        #[source]
        source: CoreError,
    },

    #[error("Could not listen on {addr}")]
    #[diagnostic(code(unistat::bind_failed), help("Pick another address with --listen."))]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Runtime ──────────────────────────────────────────────────────
    #[error("Giving up after {failures} failed syncs within {window_mins} minutes")]
    #[diagnostic(code(unistat::budget_exhausted))]
    BudgetExhausted { failures: u32, window_mins: u64 },

    #[error(transparent)]
    #[diagnostic(code(unistat::core))]
    Core(CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingSetting { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ControllerUnreachable { .. } | Self::InfluxUnavailable { .. } => {
                exit_code::CONNECTION
            }
            Self::BudgetExhausted { .. } => exit_code::BUDGET_EXHAUSTED,
            Self::Bind { .. } | Self::Core(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Classify a failed startup login against the controller at `url`.
    pub fn from_login(url: &url::Url, source: unistat_api::Error) -> Self {
        let url = url.to_string();
        if source.is_authentication() {
            Self::AuthFailed { url, source }
        } else {
            Self::ControllerUnreachable { url, source }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field } => Self::MissingSetting {
                field,
                path: unistat_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(err) => Self::Config(err),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BudgetExhausted { failures, window } => Self::BudgetExhausted {
                failures,
                window_mins: window.as_secs() / 60,
            },
            other => Self::Core(other),
        }
    }
}
