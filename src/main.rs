use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use metrics_live::chart::{ColorWheel, TelemetryChart, TracingSurface};
use metrics_live::config::ChartOptions;
use metrics_live::driver::{self, DEFAULT_CADENCE_MS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Options file is optional; default is a temporal last-value chart
    let options = match std::env::args().nth(1) {
        Some(path) => ChartOptions::load(&path).with_context(|| format!("loading options from {}", path))?,
        None => ChartOptions::new("last_value", "temporal"),
    };

    let mut chart = TelemetryChart::new(&options, TracingSurface::new(), Arc::new(ColorWheel))
        .context("building chart")?;

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, stopping");
            ctrl_c.cancel();
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let stats = driver::run(stdin, &mut chart, Duration::from_millis(DEFAULT_CADENCE_MS), token).await?;

    tracing::info!(
        series = chart.matrix().series_count(),
        rows = chart.matrix().rows(),
        batches = stats.batches,
        skipped_total = chart.skipped_total(),
        "session ended"
    );
    Ok(())
}
