//! Detects ephemeral devnet iterations from per-client head-slot telemetry.
//!
//! The detection pipeline is a strict sequence: per-client reset detection,
//! cross-client boundary clustering, iteration construction, best-effort
//! client augmentation, and a minimum-duration filter. Everything except the
//! Prometheus fetches is pure computation over an immutable sample snapshot.

pub mod detection;
pub mod models;
pub mod prometheus;
pub mod utils;
