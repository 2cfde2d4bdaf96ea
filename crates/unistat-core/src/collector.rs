// ── Pull-model collection ──
//
// One `collect()` per scrape. Every call builds its own registry, so
// overlapping scrapes never share sample state and nothing leaks between
// cycles.

use std::collections::HashSet;
use std::sync::Arc;

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::{debug, error, warn};

use unistat_api::{SessionClient, Station};

use crate::error::CoreError;
use crate::watch::{WatchSet, filter_stations};

const STATION_LABELS: [&str; 6] = ["mac", "hostname", "network", "manufacturer", "wired", "ip"];

/// Collects station metrics from the controller on demand.
///
/// Constructed once at startup with its dependencies and shared by
/// reference with the metrics server.
pub struct StationCollector {
    client: Arc<SessionClient>,
    watch: Arc<WatchSet>,
}

impl StationCollector {
    pub fn new(client: Arc<SessionClient>, watch: Arc<WatchSet>) -> Self {
        Self { client, watch }
    }

    /// Run one collection cycle.
    ///
    /// Emits `unifi_controller_up` (0 when login fails, 1 otherwise) and,
    /// when the station fetch succeeds, an uptime and last-seen sample per
    /// watched station. Controller failures are logged, never returned.
    pub async fn collect(&self) -> Result<Vec<MetricFamily>, CoreError> {
        let mut metrics = ScrapeMetrics::new()?;

        if let Err(e) = self.client.authenticate().await {
            metrics.up.set(0);
            error!(error = %e, "talking to unifi controller");
            return Ok(metrics.registry.gather());
        }
        metrics.up.set(1);

        let stations = match self.client.stations().await {
            Ok(stations) => stations,
            Err(e) => {
                error!(error = %e, "getting stations");
                return Ok(metrics.registry.gather());
            }
        };

        let watched = filter_stations(stations, &self.watch);
        debug!(stations = watched.len(), "collected watched stations");
        for station in &watched {
            metrics.observe(station);
        }

        Ok(metrics.registry.gather())
    }

    /// Run one collection cycle and encode it in the Prometheus text format.
    pub async fn render(&self) -> Result<String, CoreError> {
        let families = self.collect().await?;
        encode_text(&families)
    }
}

/// Encode metric families in the Prometheus text exposition format.
pub fn encode_text(families: &[MetricFamily]) -> Result<String, CoreError> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(families, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `Content-Type` of [`encode_text`] output.
pub fn text_content_type() -> String {
    TextEncoder::new().format_type().to_owned()
}

/// Per-scrape metric set. Dropped once the scrape is gathered.
struct ScrapeMetrics {
    registry: Registry,
    up: IntGauge,
    uptime: IntCounterVec,
    last_seen: IntCounterVec,
    /// Label sets already observed this scrape.
    seen: HashSet<[String; 6]>,
}

impl ScrapeMetrics {
    fn new() -> Result<Self, CoreError> {
        let registry = Registry::new();

        let up = IntGauge::new(
            "unifi_controller_up",
            "was talking to the Unifi controller successful",
        )?;
        let uptime = IntCounterVec::new(
            Opts::new(
                "unifi_station_uptime_seconds",
                "uptime of device connected to Unifi controller's network",
            ),
            &STATION_LABELS,
        )?;
        let last_seen = IntCounterVec::new(
            Opts::new(
                "unifi_station_last_seen",
                "unix time when a device was last seen by the Unifi controller",
            ),
            &STATION_LABELS,
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(uptime.clone()))?;
        registry.register(Box::new(last_seen.clone()))?;

        Ok(Self {
            registry,
            up,
            uptime,
            last_seen,
            seen: HashSet::new(),
        })
    }

    /// Record one station. A label set repeated within the scrape keeps
    /// its first sample; counters are never summed across entries.
    fn observe(&mut self, station: &Station) {
        let key = [
            station.mac.clone(),
            station.hostname.clone(),
            station.network.clone(),
            station.manufacturer.clone(),
            station.wired.to_string(),
            station.ip.clone(),
        ];
        let labels = key.each_ref().map(String::as_str);
        if self.seen.contains(&key) {
            warn!(mac = %station.mac, "duplicate station in controller response, skipping");
            return;
        }

        self.uptime
            .with_label_values(&labels)
            .inc_by(station.uptime);
        // Negative timestamps only come from a broken controller clock.
        self.last_seen
            .with_label_values(&labels)
            .inc_by(u64::try_from(station.last_seen).unwrap_or(0));
        self.seen.insert(key);
    }
}
