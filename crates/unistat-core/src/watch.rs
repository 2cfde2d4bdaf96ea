// ── Watched networks ──
//
// Operators pick the Unifi networks whose stations get reported. The set is
// fixed at startup and only ever used as a membership predicate.

use std::collections::HashSet;

use unistat_api::Station;

/// Immutable allow-list of network names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    networks: HashSet<String>,
}

impl WatchSet {
    pub fn new<I, S>(networks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            networks: networks.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list such as `"LAN,IoT, Guest"`.
    ///
    /// Entries are trimmed; empty entries are dropped.
    pub fn from_csv(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    pub fn contains(&self, network: &str) -> bool {
        self.networks.contains(network)
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Network names in sorted order, for logging.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.networks.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Keep only stations whose network is watched, preserving input order.
pub fn filter_stations(stations: Vec<Station>, watch: &WatchSet) -> Vec<Station> {
    stations
        .into_iter()
        .filter(|s| watch.contains(&s.network))
        .collect()
}
