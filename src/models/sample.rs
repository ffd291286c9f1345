use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single head-slot observation reported by one client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub client: String,
    pub instance: String,
    pub timestamp: DateTime<Utc>,
    pub slot: u64,
}
