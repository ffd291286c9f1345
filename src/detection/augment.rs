//! Best-effort client-list enrichment from the container inventory.
//!
//! The slot metric misses clients that never produced a valid sample, so each
//! iteration's client list is unioned with the containers seen running during
//! its interval. Enrichment is additive only and its failures never
//! invalidate an iteration.

use std::collections::BTreeSet;

use crate::models::DevnetIteration;
use crate::prometheus::PrometheusClient;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Union secondary-signal client names into the iteration's client list.
///
/// Never removes a client attributed by the primary signal; the resulting
/// list is deduplicated and sorted. Returns the newly added names.
pub fn merge_discovered_clients(
    iteration: &mut DevnetIteration,
    discovered: &BTreeSet<String>,
) -> Vec<String> {
    let known: BTreeSet<String> = iteration.clients.iter().cloned().collect();
    let added: Vec<String> = discovered.difference(&known).cloned().collect();

    if !added.is_empty() {
        iteration.clients = known.union(discovered).cloned().collect();
    }

    added
}

/// Enrich every iteration from the container inventory, one query per
/// iteration interval. A failed query is logged and leaves that iteration's
/// client list unchanged.
pub async fn augment_from_containers(
    prom: &PrometheusClient,
    iterations: &mut [DevnetIteration],
) {
    for iteration in iterations.iter_mut() {
        match prom
            .fetch_container_clients(iteration.start_time, iteration.end_time)
            .await
        {
            Ok(discovered) => {
                let added = merge_discovered_clients(iteration, &discovered);
                if !added.is_empty() {
                    log_info!("{}: added {:?} from container inventory", iteration.id, added);
                }
            }
            Err(err) => {
                log_warn!(
                    "container lookup failed for {}; keeping primary client list: {err:#}",
                    iteration.id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn iteration_with_clients(clients: &[&str]) -> DevnetIteration {
        let start = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        DevnetIteration {
            id: "pqdevnet-20260110T0000Z".to_string(),
            start_time: start,
            end_time: start + Duration::hours(4),
            duration_hours: 4.0,
            start_slot: 0,
            end_slot: 900,
            clients: clients.iter().map(|c| c.to_string()).collect(),
            notes: String::new(),
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn newly_discovered_clients_are_added_sorted() {
        let mut iteration = iteration_with_clients(&["qlean", "zeam"]);
        let added = merge_discovered_clients(&mut iteration, &set(&["lantern", "zeam"]));

        assert_eq!(added, vec!["lantern".to_string()]);
        assert_eq!(
            iteration.clients,
            vec!["lantern".to_string(), "qlean".to_string(), "zeam".to_string()]
        );
    }

    #[test]
    fn augmentation_is_monotonic() {
        let mut iteration = iteration_with_clients(&["qlean", "zeam"]);
        let before: BTreeSet<String> = iteration.clients.iter().cloned().collect();

        merge_discovered_clients(&mut iteration, &set(&["ream"]));

        let after: BTreeSet<String> = iteration.clients.iter().cloned().collect();
        assert!(after.is_superset(&before));
    }

    #[test]
    fn known_clients_are_never_removed() {
        // Secondary signal missing a primary client must not shrink the list
        let mut iteration = iteration_with_clients(&["qlean", "zeam"]);
        merge_discovered_clients(&mut iteration, &set(&["qlean"]));
        assert_eq!(
            iteration.clients,
            vec!["qlean".to_string(), "zeam".to_string()]
        );
    }

    #[test]
    fn empty_discovery_leaves_list_untouched() {
        let mut iteration = iteration_with_clients(&["zeam", "qlean"]);
        let added = merge_discovered_clients(&mut iteration, &BTreeSet::new());

        assert!(added.is_empty());
        // No rewrite at all when nothing was discovered
        assert_eq!(
            iteration.clients,
            vec!["zeam".to_string(), "qlean".to_string()]
        );
    }

    #[test]
    fn duplicates_are_collapsed() {
        let mut iteration = iteration_with_clients(&["zeam"]);
        merge_discovered_clients(&mut iteration, &set(&["zeam", "lantern", "lantern"]));
        assert_eq!(
            iteration.clients,
            vec!["lantern".to_string(), "zeam".to_string()]
        );
    }
}
