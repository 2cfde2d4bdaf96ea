// ── Core error types ──
//
// Controller failures are passed through from `unistat-api` untouched so
// the binary can tell login, transport, status, and decode failures apart.
// Backend and budget failures originate here.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Controller ───────────────────────────────────────────────────
    #[error("controller request failed: {0}")]
    Controller(#[from] unistat_api::Error),

    // ── Time-series backend ──────────────────────────────────────────
    #[error("InfluxDB write failed: {message}")]
    BackendWrite {
        message: String,
        /// HTTP status code (if the backend answered at all).
        status: Option<u16>,
    },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Metrics ──────────────────────────────────────────────────────
    #[error("metric registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    // ── Sync loop ────────────────────────────────────────────────────
    #[error("{failures} sync failures within {window:?}, giving up")]
    BudgetExhausted { failures: u32, window: Duration },
}

impl CoreError {
    /// Returns `true` if the controller refused or could not complete login.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Controller(e) if e.is_authentication())
    }
}
