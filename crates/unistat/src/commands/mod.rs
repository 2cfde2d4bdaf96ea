//! Command handlers, one module per exporter mode.

pub mod influxdb;
pub mod prometheus;

use std::sync::Arc;

use tracing::info;

use unistat_api::SessionClient;
use unistat_config::Config;
use unistat_core::WatchSet;

use crate::error::CliError;

/// The validated watch-set, logged once at startup.
pub(crate) fn watch_set(config: &Config) -> Result<Arc<WatchSet>, CliError> {
    let watch = config.watch_set()?;
    info!(networks = ?watch.sorted(), "watching networks");
    Ok(Arc::new(watch))
}

/// Build the controller client and log in once.
///
/// A failed first login is fatal in both modes.
pub(crate) async fn connect(config: &Config) -> Result<Arc<SessionClient>, CliError> {
    let settings = config.controller()?;
    let client = SessionClient::new(settings.url.clone(), settings.credentials, &settings.transport)
        .map_err(|e| CliError::from_login(&settings.url, e))?;

    client
        .authenticate()
        .await
        .map_err(|e| CliError::from_login(&settings.url, e))?;
    info!(url = %settings.url, "connected to Unifi controller");

    Ok(Arc::new(client))
}

/// Resolves once the process is asked to stop.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
