use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

use crate::detection::resets::ResetEvent;

/// A group of resets from multiple clients close together in time.
///
/// `start` and `end` are the earliest and latest member-reset timestamps.
/// Every member was within tolerance of the cluster's running `end` at the
/// time it was added.
#[derive(Debug, Clone)]
pub struct BoundaryCluster {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub clients: BTreeSet<String>,
    pub resets: Vec<ResetEvent>,
}

impl BoundaryCluster {
    fn seed(reset: ResetEvent) -> Self {
        let mut clients = BTreeSet::new();
        clients.insert(reset.client.clone());
        Self {
            start: reset.timestamp,
            end: reset.timestamp,
            clients,
            resets: vec![reset],
        }
    }

    fn fold(&mut self, reset: ResetEvent) {
        self.clients.insert(reset.client.clone());
        // Input is sorted by timestamp, so end only moves forward
        self.end = self.end.max(reset.timestamp);
        self.resets.push(reset);
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

/// Merge resets across clients into boundary clusters.
///
/// Chaining is transitive: a reset joins the current cluster if it lands
/// within `tolerance` of the cluster's running end, so a long run of closely
/// spaced resets forms one cluster even when its first and last members are
/// far apart. Only clusters with at least `min_clients` distinct clients are
/// kept as boundaries.
pub fn cluster_resets(
    mut resets: Vec<ResetEvent>,
    tolerance: Duration,
    min_clients: usize,
) -> Vec<BoundaryCluster> {
    resets.sort_by_key(|r| r.timestamp);

    let mut clusters = Vec::new();
    let mut current: Option<BoundaryCluster> = None;

    for reset in resets {
        match &mut current {
            Some(cluster) if reset.timestamp - cluster.end <= tolerance => {
                cluster.fold(reset);
            }
            _ => {
                if let Some(closed) = current.take() {
                    if closed.client_count() >= min_clients {
                        clusters.push(closed);
                    }
                }
                current = Some(BoundaryCluster::seed(reset));
            }
        }
    }

    // Close the final open cluster
    if let Some(closed) = current {
        if closed.client_count() >= min_clients {
            clusters.push(closed);
        }
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reset(client: &str, minute: i64) -> ResetEvent {
        let base = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        let timestamp = base + Duration::minutes(minute);
        ResetEvent {
            client: client.to_string(),
            timestamp,
            new_slot: 0,
            prev_slot: 1000,
            prev_timestamp: timestamp - Duration::minutes(1),
        }
    }

    #[test]
    fn chaining_is_transitive() {
        // Each reset is within 10min of the previous; first and last are 15min
        // apart, beyond tolerance of each other, yet all chain into one cluster
        let resets = vec![
            reset("a", 0),
            reset("b", 5),
            reset("c", 10),
            reset("d", 15),
        ];
        let clusters = cluster_resets(resets, Duration::minutes(10), 1);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].start, reset("a", 0).timestamp);
        assert_eq!(clusters[0].end, reset("d", 15).timestamp);
        assert_eq!(clusters[0].client_count(), 4);
    }

    #[test]
    fn gap_beyond_tolerance_splits_clusters() {
        let resets = vec![
            reset("a", 0),
            reset("b", 3),
            reset("a", 60),
            reset("b", 62),
        ];
        let clusters = cluster_resets(resets, Duration::minutes(10), 2);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].end, reset("b", 3).timestamp);
        assert_eq!(clusters[1].start, reset("a", 60).timestamp);
    }

    #[test]
    fn cluster_below_min_clients_is_discarded() {
        // Three resets but only one distinct client
        let resets = vec![reset("a", 0), reset("a", 2), reset("a", 4)];
        assert!(cluster_resets(resets, Duration::minutes(10), 2).is_empty());
    }

    #[test]
    fn cluster_meeting_min_clients_exactly_is_kept() {
        let resets = vec![reset("a", 0), reset("b", 2)];
        let clusters = cluster_resets(resets, Duration::minutes(10), 2);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].client_count(), 2);
    }

    #[test]
    fn final_open_cluster_is_closed_at_end_of_input() {
        let resets = vec![
            reset("a", 0),
            reset("a", 30),
            reset("b", 31),
        ];
        let clusters = cluster_resets(resets, Duration::minutes(10), 2);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].start, reset("a", 30).timestamp);
    }

    #[test]
    fn unsorted_input_is_sorted_before_clustering() {
        let resets = vec![reset("b", 5), reset("a", 0)];
        let clusters = cluster_resets(resets, Duration::minutes(10), 2);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].start, reset("a", 0).timestamp);
    }

    #[test]
    fn no_resets_yields_no_clusters() {
        assert!(cluster_resets(Vec::new(), Duration::minutes(10), 2).is_empty());
    }
}
