use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct DiscoveryCounters {
    rounds: u64,
    proposals_accepted: u64,
    proposals_dropped: BTreeMap<String, u64>,
    provider_failures: u64,
    cancelled_rounds: u64,
    dangling_edges_skipped: u64,
}

/// Shared counters for discovery rounds and graph rebuilds.
#[derive(Clone, Default)]
pub struct DiscoveryMetrics {
    state: Arc<Mutex<DiscoveryCounters>>,
}

impl DiscoveryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DiscoveryCounters> {
        // Counters stay usable even if a holder panicked mid-update.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_round(&self, accepted: usize) {
        let mut state = self.lock();
        state.rounds += 1;
        state.proposals_accepted += accepted as u64;
    }

    pub fn record_drop(&self, reason: &str) {
        let mut state = self.lock();
        *state.proposals_dropped.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn record_provider_failure(&self) {
        self.lock().provider_failures += 1;
    }

    pub fn record_cancelled(&self) {
        self.lock().cancelled_rounds += 1;
    }

    /// Dangling records skipped by the most recent rebuild.
    pub fn set_dangling(&self, count: usize) {
        self.lock().dangling_edges_skipped = count as u64;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        MetricsSnapshot {
            rounds: state.rounds,
            proposals_accepted: state.proposals_accepted,
            proposals_dropped: state.proposals_dropped.values().sum(),
            dropped_by_reason: state.proposals_dropped.clone(),
            provider_failures: state.provider_failures,
            cancelled_rounds: state.cancelled_rounds,
            dangling_edges_skipped: state.dangling_edges_skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub rounds: u64,
    pub proposals_accepted: u64,
    pub proposals_dropped: u64,
    pub dropped_by_reason: BTreeMap<String, u64>,
    pub provider_failures: u64,
    pub cancelled_rounds: u64,
    pub dangling_edges_skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_are_bucketed_by_reason() {
        let metrics = DiscoveryMetrics::new();
        metrics.record_drop("below_threshold");
        metrics.record_drop("below_threshold");
        metrics.record_drop("unknown_target");
        metrics.record_round(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.rounds, 1);
        assert_eq!(snapshot.proposals_accepted, 3);
        assert_eq!(snapshot.proposals_dropped, 3);
        assert_eq!(snapshot.dropped_by_reason["below_threshold"], 2);
    }

    #[test]
    fn clones_share_counters() {
        let metrics = DiscoveryMetrics::new();
        let handle = metrics.clone();
        handle.record_provider_failure();
        assert_eq!(metrics.snapshot().provider_failures, 1);
    }

    #[test]
    fn dangling_reflects_latest_build_only() {
        let metrics = DiscoveryMetrics::new();
        metrics.set_dangling(2);
        metrics.set_dangling(1);
        assert_eq!(metrics.snapshot().dangling_edges_skipped, 1);
    }
}
