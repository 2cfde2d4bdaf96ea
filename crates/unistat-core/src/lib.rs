//! Metric emission layer between `unistat-api` and the exporter binary.
//!
//! - **[`WatchSet`] / [`filter_stations`]**: the network allow-list and the
//!   pure, order-preserving filter every adapter runs stations through.
//!
//! - **[`StationCollector`]**: pull model. Each call to
//!   [`collect()`](StationCollector::collect) logs in, fetches, filters, and
//!   builds a fresh set of Prometheus metric families. Nothing is cached
//!   between calls, so concurrent scrapes each get their own view.
//!
//! - **[`SyncLoop`]**: push model. Fetches on a fixed interval, batches the
//!   filtered stations into InfluxDB line protocol, and writes each batch with
//!   a single [`InfluxClient::write`] call. A rolling [`FailureBudget`] turns
//!   sustained failure into a fatal error.

pub mod budget;
pub mod collector;
pub mod error;
pub mod influx;
pub mod sync;
pub mod watch;

// ── Primary re-exports ──────────────────────────────────────────────
pub use budget::FailureBudget;
pub use collector::StationCollector;
pub use error::CoreError;
pub use influx::{Batch, FieldValue, InfluxClient, InfluxConfig, Point};
pub use sync::SyncLoop;
pub use watch::{WatchSet, filter_stations};

pub use unistat_api::Station;
