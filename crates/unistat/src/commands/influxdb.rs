//! Push mode: write watched stations to InfluxDB on a fixed interval.

use tracing::info;

use unistat_config::Config;
use unistat_core::{InfluxClient, SyncLoop};

use crate::error::CliError;

pub async fn run(config: &Config) -> Result<(), CliError> {
    let watch = super::watch_set(config)?;
    let settings = config.sync()?;
    let client = super::connect(config).await?;

    let url = settings.influx.url.to_string();
    let backend = InfluxClient::new(settings.influx)?;
    backend
        .ping()
        .await
        .map_err(|source| CliError::InfluxUnavailable {
            url: url.clone(),
            source,
        })?;
    info!(%url, database = backend.database(), "connected to InfluxDB");

    let sync = SyncLoop::new(client, backend, watch, settings.interval);
    tokio::select! {
        result = sync.run() => result.map_err(CliError::from),
        () = super::shutdown_signal() => Ok(()),
    }
}
