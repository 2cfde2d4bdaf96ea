// ── Push-model sync loop ──
//
// Strictly sequential: fetch, filter, batch, write, sleep. The sleep is the
// only suspension point between ticks and ticks never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use unistat_api::{SessionClient, Station};

use crate::budget::FailureBudget;
use crate::error::CoreError;
use crate::influx::{Batch, InfluxClient, Point};
use crate::watch::{WatchSet, filter_stations};

/// Measurement every station point is written under.
pub const MEASUREMENT: &str = "unifi_client";

/// Periodically pushes watched stations to InfluxDB.
pub struct SyncLoop {
    client: Arc<SessionClient>,
    backend: InfluxClient,
    watch: Arc<WatchSet>,
    interval: Duration,
    budget: FailureBudget,
}

impl SyncLoop {
    pub fn new(
        client: Arc<SessionClient>,
        backend: InfluxClient,
        watch: Arc<WatchSet>,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            backend,
            watch,
            interval,
            budget: FailureBudget::new(Instant::now()),
        }
    }

    /// Replace the default failure budget.
    pub fn with_budget(mut self, budget: FailureBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Run one sync cycle. Returns the number of points written.
    ///
    /// Any controller failure aborts the tick before anything is written.
    pub async fn tick(&self) -> Result<usize, CoreError> {
        let stations = self.client.authenticated_stations().await?;
        let watched = filter_stations(stations, &self.watch);
        let batch = build_batch(&watched);

        self.backend.write(&batch).await?;
        Ok(batch.len())
    }

    /// Tick forever, sleeping `interval` after every tick.
    ///
    /// Only returns on a fatal error: once more failures pile up within the
    /// budget window than the budget allows.
    pub async fn run(mut self) -> Result<(), CoreError> {
        info!(
            interval_secs = self.interval.as_secs(),
            database = self.backend.database(),
            "starting sync loop"
        );

        loop {
            let now = Instant::now();
            match self.tick().await {
                Ok(points) => {
                    self.budget.roll(now);
                    debug!(points, "synced stations to influxdb");
                }
                Err(e) => {
                    error!(error = %e, "syncing stations");
                    let failures = self.budget.record_failure(now)?;
                    warn!(failures, "sync failure recorded");
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

/// One point per station, timestamped at the station's last-seen time.
pub fn build_batch(stations: &[Station]) -> Batch {
    let mut batch = Batch::new();
    for sta in stations {
        batch.add_point(
            Point::new(MEASUREMENT, sta.last_seen)
                .tag("mac", sta.mac.as_str())
                .tag("hostname", sta.hostname.as_str())
                .tag("wired", sta.wired.to_string())
                .field("uptime", sta.uptime)
                .field("ip", sta.ip.as_str())
                .field("network", sta.network.as_str()),
        );
    }
    batch
}
