use chrono::Duration;

/// Configuration for iteration-boundary detection with tunable thresholds.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Minimum slot decrease that counts as a reset (a drop equal to the
    /// threshold is treated as normal jitter)
    pub reset_threshold: u64,

    /// Resets within this many minutes of a cluster's running end chain into it
    pub tolerance_minutes: i64,

    /// Distinct clients that must reset together to confirm a boundary
    pub min_clients: usize,

    /// Iterations shorter than this many minutes are dropped (0 = keep all)
    pub min_duration_minutes: u64,

    /// Gap between an iteration's end and the next boundary's start.
    /// Downstream consumers must match this adjacency convention exactly.
    pub boundary_gap_secs: i64,

    /// Allowed gap between data start and the first boundary before a
    /// pre-existing leading iteration is synthesized
    pub leading_slack_minutes: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            reset_threshold: 100,
            tolerance_minutes: 10,
            min_clients: 2,
            min_duration_minutes: 0,
            boundary_gap_secs: 1,
            leading_slack_minutes: 5,
        }
    }
}

impl DetectionConfig {
    pub fn tolerance(&self) -> Duration {
        Duration::minutes(self.tolerance_minutes)
    }

    pub fn boundary_gap(&self) -> Duration {
        Duration::seconds(self.boundary_gap_secs)
    }

    pub fn leading_slack(&self) -> Duration {
        Duration::minutes(self.leading_slack_minutes)
    }
}
