//! Top-level detection pipeline over an immutable sample snapshot.
//!
//! Resets, clustering, and interval construction are pure and strictly
//! sequential; clustering in particular is order-dependent (chained merging)
//! and must not be parallelized.

use crate::detection::builder::build_iterations;
use crate::detection::cluster::cluster_resets;
use crate::detection::config::DetectionConfig;
use crate::detection::resets::detect_slot_resets;
use crate::models::{DevnetIteration, Sample};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Partition the observed window into devnet iterations.
///
/// 1. Detect slot resets per client
/// 2. Cluster resets that happen across clients within tolerance
/// 3. Build closed iteration records from the boundaries
pub fn detect_iterations(samples: &[Sample], config: &DetectionConfig) -> Vec<DevnetIteration> {
    if samples.is_empty() {
        return Vec::new();
    }

    let resets = detect_slot_resets(samples, config.reset_threshold);
    log_info!(
        "found {} slot resets (threshold: {} slots)",
        resets.len(),
        config.reset_threshold
    );

    let clusters = cluster_resets(resets, config.tolerance(), config.min_clients);
    log_info!(
        "found {} devnet boundaries (tolerance: {}min, min clients: {})",
        clusters.len(),
        config.tolerance_minutes,
        config.min_clients
    );

    build_iterations(samples, &clusters, config)
}
