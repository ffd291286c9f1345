use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::models::DevnetIteration;

/// Parameters a detection run was invoked with, recorded for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reset_threshold: u64,
    pub tolerance_minutes: i64,
    pub min_clients: usize,
    pub min_duration_minutes: u64,
}

/// Output record of one detection run. Downstream consumers treat this as
/// read-only reference data keyed by iteration id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionManifest {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub detection_params: DetectionParams,
    pub devnets: Vec<DevnetIteration>,
}

impl DetectionManifest {
    pub const SCHEMA_VERSION: &'static str = "1.0";

    pub fn new(detection_params: DetectionParams, devnets: Vec<DevnetIteration>) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            detection_params,
            devnets,
        }
    }

    /// Write the manifest as pretty-printed JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write manifest to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params() -> DetectionParams {
        DetectionParams {
            start_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 1, 8, 0, 0, 0).unwrap(),
            reset_threshold: 100,
            tolerance_minutes: 10,
            min_clients: 2,
            min_duration_minutes: 0,
        }
    }

    #[test]
    fn serializes_with_interchange_field_names() {
        let manifest = DetectionManifest::new(params(), Vec::new());
        let value = serde_json::to_value(&manifest).unwrap();

        assert!(value.get("schema_version").is_some());
        assert!(value.get("generated_at").is_some());
        assert!(value.get("devnets").is_some());

        let params = value.get("detection_params").unwrap();
        for key in [
            "start_time",
            "end_time",
            "reset_threshold",
            "tolerance_minutes",
            "min_clients",
            "min_duration_minutes",
        ] {
            assert!(params.get(key).is_some(), "missing field {key}");
        }
    }

    #[test]
    fn schema_version_is_stamped() {
        let manifest = DetectionManifest::new(params(), Vec::new());
        assert_eq!(manifest.schema_version, DetectionManifest::SCHEMA_VERSION);
    }
}
