use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

use crate::detection::cluster::BoundaryCluster;
use crate::detection::config::DetectionConfig;
use crate::models::{devnet_id_from_timestamp, DevnetIteration, Sample};

const SINGLE_ITERATION_NOTE: &str = "Single iteration (no multi-client resets detected)";
const PRE_EXISTING_NOTE: &str = "Pre-existing devnet (data starts before first detected reset)";

/// Convert accepted boundary clusters into closed iteration records.
///
/// Each cluster starts a new iteration that runs until just before the next
/// cluster's start (or to the data maximum for the last one). If the data
/// begins well before the first boundary, a leading iteration is synthesized
/// for the partially observed run already in progress. With no accepted
/// clusters the whole observed range collapses to one fallback iteration.
pub fn build_iterations(
    samples: &[Sample],
    clusters: &[BoundaryCluster],
    config: &DetectionConfig,
) -> Vec<DevnetIteration> {
    let Some((data_start, data_end)) = observed_span(samples) else {
        return Vec::new();
    };

    if clusters.is_empty() {
        return make_iteration(samples, data_start, data_end, SINGLE_ITERATION_NOTE.to_string())
            .into_iter()
            .collect();
    }

    let mut ordered: Vec<&BoundaryCluster> = clusters.iter().collect();
    ordered.sort_by_key(|c| c.start);

    let mut iterations = Vec::new();

    // Data collection may begin mid-iteration; synthesize a leading record
    // unless the first boundary is within slack of the data start
    let first_start = ordered[0].start;
    if data_start < first_start - config.leading_slack() {
        iterations.extend(make_iteration(
            samples,
            data_start,
            first_start - config.boundary_gap(),
            PRE_EXISTING_NOTE.to_string(),
        ));
    }

    for (i, cluster) in ordered.iter().enumerate() {
        let end = match ordered.get(i + 1) {
            Some(next) => next.start - config.boundary_gap(),
            None => data_end,
        };
        let notes = format!("Detected from {} client resets", cluster.client_count());
        iterations.extend(make_iteration(samples, cluster.start, end, notes));
    }

    iterations
}

fn observed_span(samples: &[Sample]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = samples.iter().map(|s| s.timestamp).min()?;
    let end = samples.iter().map(|s| s.timestamp).max()?;
    Some((start, end))
}

/// Slot range and distinct clients observed within a closed interval.
struct PeriodStats {
    start_slot: u64,
    end_slot: u64,
    clients: Vec<String>,
}

fn period_stats(samples: &[Sample], start: DateTime<Utc>, end: DateTime<Utc>) -> Option<PeriodStats> {
    let mut min_slot = u64::MAX;
    let mut max_slot = 0u64;
    let mut clients = BTreeSet::new();

    for sample in samples {
        if sample.timestamp < start || sample.timestamp > end {
            continue;
        }
        min_slot = min_slot.min(sample.slot);
        max_slot = max_slot.max(sample.slot);
        clients.insert(sample.client.clone());
    }

    if clients.is_empty() {
        return None;
    }

    Some(PeriodStats {
        start_slot: min_slot,
        end_slot: max_slot,
        clients: clients.into_iter().collect(),
    })
}

/// Returns `None` when no samples fall inside the interval; such an
/// iteration is dropped rather than emitted empty.
fn make_iteration(
    samples: &[Sample],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    notes: String,
) -> Option<DevnetIteration> {
    let stats = period_stats(samples, start, end)?;
    Some(DevnetIteration {
        id: devnet_id_from_timestamp(start),
        start_time: start,
        end_time: end,
        duration_hours: round_hours(end - start),
        start_slot: stats.start_slot,
        end_slot: stats.end_slot,
        clients: stats.clients,
        notes,
    })
}

fn round_hours(span: Duration) -> f64 {
    let hours = span.num_seconds() as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}
