use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::Sample;

/// A sharp drop in one client's reported head slot, signaling a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetEvent {
    pub client: String,
    pub timestamp: DateTime<Utc>,
    pub new_slot: u64,
    pub prev_slot: u64,
    pub prev_timestamp: DateTime<Utc>,
}

/// Scan each client's samples independently, in timestamp order, and emit a
/// reset wherever the slot drops by more than `reset_threshold`.
///
/// Smaller decreases (including one exactly equal to the threshold) are
/// normal slot jitter or reorgs and are ignored. The previous-sample cursor
/// always advances, so detection is not re-based at a reset.
pub fn detect_slot_resets(samples: &[Sample], reset_threshold: u64) -> Vec<ResetEvent> {
    let mut by_client: BTreeMap<&str, Vec<&Sample>> = BTreeMap::new();
    for sample in samples {
        by_client.entry(sample.client.as_str()).or_default().push(sample);
    }

    let mut resets = Vec::new();
    for (client, mut rows) in by_client {
        rows.sort_by_key(|s| s.timestamp);

        let mut prev: Option<(u64, DateTime<Utc>)> = None;
        for row in rows {
            if let Some((prev_slot, prev_timestamp)) = prev {
                // Strict comparison: a drop of exactly reset_threshold does not fire
                let floor = prev_slot as i64 - reset_threshold as i64;
                if (row.slot as i64) < floor {
                    resets.push(ResetEvent {
                        client: client.to_string(),
                        timestamp: row.timestamp,
                        new_slot: row.slot,
                        prev_slot,
                        prev_timestamp,
                    });
                }
            }
            prev = Some((row.slot, row.timestamp));
        }
    }

    resets
}
