//! Devnet iteration data model.
//!
//! One iteration is a contiguous run of the devnet between restarts. The
//! ordered list of iterations produced by a detection run tiles the observed
//! window: each iteration ends just before the next boundary's start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One contiguous run of the devnet between restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevnetIteration {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: f64,
    pub start_slot: u64,
    pub end_slot: u64,
    pub clients: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl DevnetIteration {
    pub fn duration_minutes(&self) -> f64 {
        self.duration_hours * 60.0
    }
}

/// Derive a deterministic iteration id from its start timestamp, so re-running
/// detection over the same inputs reproduces the same ids.
pub fn devnet_id_from_timestamp(start: DateTime<Utc>) -> String {
    format!("pqdevnet-{}", start.format("%Y%m%dT%H%MZ"))
}
