use std::time::Duration;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use hifitime::Epoch;
use satcat::{
    CatalogSource, IngestReport, SceneRecorder, Sgp4Propagator, Tracker, TrackerConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless satellite catalog tracker: ingests element sets and refreshes one shard per tick.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Catalog source (file path or URL), repeatable; replaces the configured sources
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Number of scheduler shards, overrides the configuration
    #[arg(long)]
    shards: Option<usize>,

    /// Number of ticks to run before exiting
    #[arg(long, default_value_t = 64)]
    ticks: u64,

    /// Delay between two ticks in milliseconds
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {path}"))?,
        None => TrackerConfig::default(),
    };
    if let Some(shards) = cli.shards {
        config.shard_count = shards;
    }

    let sources = if cli.sources.is_empty() {
        config.sources()?
    } else {
        cli.sources
            .iter()
            .map(|s| CatalogSource::try_from(s.as_str()))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut tracker: Tracker<Sgp4Propagator, SceneRecorder> =
        Tracker::new(config, SceneRecorder::new())?;

    let reference = Epoch::now()?;
    let mut total = IngestReport::default();
    for source in &sources {
        let report = tracker
            .ingest(source, &reference)
            .await
            .with_context(|| format!("ingesting {source}"))?;
        total.merge(&report);
    }
    info!(
        report = %total,
        catalog = %tracker.catalog(),
        "catalog ready"
    );

    let mut interval = tokio::time::interval(Duration::from_millis(cli.interval_ms.max(1)));
    for _ in 0..cli.ticks {
        interval.tick().await;
        let now = Epoch::now()?;
        if let Some(report) = tracker.tick(&now) {
            info!(
                shard = report.shard,
                updated = report.updated,
                failed = report.failed,
                "tick"
            );
        }
    }

    info!(
        live_markers = tracker.visual().live_count(),
        disposed = tracker.visual().disposed_count(),
        "done"
    );
    Ok(())
}
