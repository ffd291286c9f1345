//! Thin Prometheus HTTP API client.
//!
//! Serves as the sample source (head-slot history) and as the secondary
//! container-inventory signal. Only `query_range` is needed; responses use
//! the standard matrix envelope.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use crate::models::Sample;
use crate::prometheus::containers::extract_client_name;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

const HEAD_SLOT_QUERY: &str = "lean_head_slot";
const CONTAINER_ACTIVITY_QUERY: &str = "container_cpu_usage_seconds_total";
const CONTAINER_QUERY_STEP: &str = "30m";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct RangeResponse {
    status: String,
    #[serde(default)]
    data: Option<RangeData>,
}

#[derive(Debug, Deserialize)]
struct RangeData {
    #[serde(default)]
    result: Vec<RangeSeries>,
}

/// One time series from a range query: label set plus `[timestamp, value]`
/// pairs, values as strings per the Prometheus wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(f64, String)>,
}

pub struct PrometheusClient {
    base_url: String,
    http: HttpClient,
}

impl PrometheusClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a range query and return the matrix result.
    pub async fn query_range(
        &self,
        query: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: &str,
    ) -> Result<Vec<RangeSeries>> {
        let url = format!("{}/api/v1/query_range", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query),
                ("start", &start.timestamp().to_string()),
                ("end", &end.timestamp().to_string()),
                ("step", step),
            ])
            .send()
            .await
            .with_context(|| format!("Range query request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Range query {query} was rejected"))?
            .json::<RangeResponse>()
            .await
            .context("Failed to decode Prometheus response")?;

        if response.status != "success" {
            bail!(
                "Prometheus returned status {:?} for query {query}",
                response.status
            );
        }

        Ok(response.data.map(|d| d.result).unwrap_or_default())
    }

    /// Fetch head-slot history for all clients, ordered by (client, timestamp).
    ///
    /// An empty window is a normal empty result, not an error.
    pub async fn fetch_head_slot_history(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: &str,
    ) -> Result<Vec<Sample>> {
        let series = self.query_range(HEAD_SLOT_QUERY, start, end, step).await?;
        log_info!("head-slot query returned {} series", series.len());

        let mut samples = flatten_head_slot_series(&series);
        samples.sort_by(|a, b| (&a.client, a.timestamp).cmp(&(&b.client, b.timestamp)));
        Ok(samples)
    }

    /// Client names seen running as workload containers during the window.
    pub async fn fetch_container_clients(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeSet<String>> {
        let series = self
            .query_range(CONTAINER_ACTIVITY_QUERY, start, end, CONTAINER_QUERY_STEP)
            .await?;

        let mut clients = BTreeSet::new();
        for s in &series {
            let container = s
                .metric
                .get("name")
                .or_else(|| s.metric.get("container"));
            if let Some(name) = container {
                if let Some(client) = extract_client_name(name) {
                    clients.insert(client);
                }
            }
        }
        Ok(clients)
    }
}

/// Flatten head-slot series into sample rows. The `job` label carries the
/// client name. Rows with unparseable values are skipped.
fn flatten_head_slot_series(series: &[RangeSeries]) -> Vec<Sample> {
    let mut samples = Vec::new();
    for s in series {
        let client = label_or_unknown(&s.metric, "job");
        let instance = label_or_unknown(&s.metric, "instance");

        for (ts, value) in &s.values {
            let Some(timestamp) = DateTime::from_timestamp(*ts as i64, 0) else {
                continue;
            };
            let Ok(slot) = value.parse::<f64>() else {
                continue;
            };
            samples.push(Sample {
                client: client.clone(),
                instance: instance.clone(),
                timestamp,
                slot: slot as u64,
            });
        }
    }
    samples
}

fn label_or_unknown(metric: &HashMap<String, String>, label: &str) -> String {
    metric
        .get(label)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}
