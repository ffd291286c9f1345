pub mod client;
pub mod containers;

pub use client::{PrometheusClient, RangeSeries};
