//! Devnet iteration detection CLI.
//!
//! Fetches head-slot history from Prometheus for a bounded window, partitions
//! it into iterations, and writes the detection manifest consumed by the
//! downstream fetch and render steps.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;

use devnet_detect::detection::{
    augment_from_containers, detect_iterations, filter_min_duration, DetectionConfig,
};
use devnet_detect::models::{DetectionManifest, DetectionParams, DevnetIteration};
use devnet_detect::prometheus::PrometheusClient;

/// Detect devnet iterations from Prometheus head-slot telemetry
#[derive(Parser, Debug)]
#[command(name = "devnet-detect", version, about)]
struct Cli {
    /// Days to look back when no explicit start date is given
    #[arg(long, default_value_t = 7)]
    days: i64,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Output path for the detection manifest
    #[arg(short, long, default_value = "data/devnets.json")]
    output: PathBuf,

    /// Prometheus base URL
    #[arg(long, env = "PROMETHEUS_URL")]
    prometheus_url: Option<String>,

    /// Query resolution step for the head-slot history
    #[arg(long, default_value = "1m")]
    step: String,

    /// Minimum slot decrease to detect as a reset
    #[arg(long, default_value_t = 100)]
    reset_threshold: u64,

    /// Minutes tolerance for clustering resets across clients
    #[arg(long, default_value_t = 10)]
    tolerance: i64,

    /// Minimum number of clients that must reset together to count as a boundary
    #[arg(long, default_value_t = 2)]
    min_clients: usize,

    /// Minimum iteration duration in minutes (filters out failed runs)
    #[arg(long, default_value_t = 0)]
    min_duration: u64,
}

impl Cli {
    fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start_time = match self.start {
            Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
            None => Utc::now() - Duration::days(self.days),
        };
        // An explicit end date is inclusive: extend to the last second of the day
        let end_time = match self.end {
            Some(date) => {
                date.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1)
            }
            None => Utc::now(),
        };
        (start_time, end_time)
    }

    fn detection_config(&self) -> DetectionConfig {
        DetectionConfig {
            reset_threshold: self.reset_threshold,
            tolerance_minutes: self.tolerance,
            min_clients: self.min_clients,
            min_duration_minutes: self.min_duration,
            ..DetectionConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    // Missing connection parameters are fatal before any detection work begins
    let prometheus_url = cli
        .prometheus_url
        .clone()
        .context("PROMETHEUS_URL environment variable (or --prometheus-url) is required")?;
    let prom = PrometheusClient::new(&prometheus_url)?;
    log::info!("Prometheus URL: {}", prom.base_url());

    let (start_time, end_time) = cli.window();
    let config = cli.detection_config();

    log::info!(
        "Fetching head-slot data from {} to {}...",
        start_time.date_naive(),
        end_time.date_naive()
    );
    let samples = prom
        .fetch_head_slot_history(start_time, end_time, &cli.step)
        .await?;

    if samples.is_empty() {
        println!("No data found.");
        return Ok(());
    }

    let clients: BTreeSet<&str> = samples.iter().map(|s| s.client.as_str()).collect();
    log::info!(
        "Found {} data points across {} clients: {}",
        samples.len(),
        clients.len(),
        clients.iter().copied().collect::<Vec<_>>().join(", ")
    );

    let mut iterations = detect_iterations(&samples, &config);
    if iterations.is_empty() {
        println!("No devnet iterations found.");
        return Ok(());
    }

    log::info!("Fetching container data to discover all running clients...");
    augment_from_containers(&prom, &mut iterations).await;

    let before = iterations.len();
    let iterations = filter_min_duration(iterations, config.min_duration_minutes);
    if iterations.len() < before {
        log::info!(
            "Filtered out {} iteration(s) shorter than {} minutes",
            before - iterations.len(),
            config.min_duration_minutes
        );
    }
    if iterations.is_empty() {
        println!("No devnet iterations meet the minimum duration requirement.");
        return Ok(());
    }

    print_summary(&iterations);

    let manifest = DetectionManifest::new(
        DetectionParams {
            start_time,
            end_time,
            reset_threshold: config.reset_threshold,
            tolerance_minutes: config.tolerance_minutes,
            min_clients: config.min_clients,
            min_duration_minutes: config.min_duration_minutes,
        },
        iterations,
    );
    manifest.write_to(&cli.output)?;
    println!(
        "\nSaved {} iteration(s) to {}",
        manifest.devnets.len(),
        cli.output.display()
    );

    Ok(())
}

fn print_summary(iterations: &[DevnetIteration]) {
    println!("\n{}", "=".repeat(60));
    println!("Detected {} devnet iteration(s):", iterations.len());
    println!("{}", "=".repeat(60));

    for iteration in iterations {
        println!("\n{}:", iteration.id);
        println!("  Start: {}", iteration.start_time.to_rfc3339());
        println!("  End:   {}", iteration.end_time.to_rfc3339());
        println!("  Duration: {} hours", iteration.duration_hours);
        println!("  Slots: {} -> {}", iteration.start_slot, iteration.end_slot);
        println!("  Clients: {}", iteration.clients.join(", "));
        if !iteration.notes.is_empty() {
            println!("  Notes: {}", iteration.notes);
        }
    }
}
