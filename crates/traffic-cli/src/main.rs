//! # Traffic Count
//!
//! Replays a JSON-lines file of tracked vehicle detections through the
//! zone-transition counter and writes the directional traffic summary.
//!
//! Counting runs on a blocking worker; the async foreground logs progress
//! from the published snapshots and stops the worker on Ctrl+C.

mod error;
mod report;
mod settings;
mod source;

use crate::settings::Settings;
use crate::source::JsonLinesSource;

use traffic_core::ExitZoneId;
use traffic_counter::{CancellationToken, FrameProcessor};
use traffic_telemetry::MetricsCollector;

use anyhow::Context;
use clap::Parser;
use std::cell::Cell;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Count vehicles moving between entry and exit zones
#[derive(Parser, Debug)]
#[command(name = "traffic-count", version, about)]
struct Args {
    /// JSON-lines file of tracked detections, one frame per line
    detections: PathBuf,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Summary output path, overrides the configured one
    #[arg(short, long)]
    summary: Option<PathBuf>,

    /// Write Prometheus metrics to this path at the end of the run
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    info!("Starting traffic counter v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(path) = args.summary {
        settings.summary_path = path;
    }
    if let Some(path) = args.metrics {
        settings.metrics_path = Some(path);
    }
    info!("Configuration loaded");
    info!("   Zones: {}", settings.zones.zone_count());
    info!("   Anchor: {:?}", settings.zones.anchor);
    info!("   Summary: {}", settings.summary_path.display());

    let mut processor = FrameProcessor::new(settings.zones.build_zone_set()?);
    let snapshots = processor.snapshot_handle();
    let metrics = Arc::new(MetricsCollector::new()?);

    let source = JsonLinesSource::open(&args.detections)
        .with_context(|| format!("failed to open {}", args.detections.display()))?;
    let max_frames = args.max_frames.unwrap_or(usize::MAX);

    let token = CancellationToken::new();

    // Counting worker
    let worker_token = token.clone();
    let worker_metrics = metrics.clone();
    let worker_snapshots = snapshots.clone();
    let worker_zones = settings.zones.clone();
    let mut worker = tokio::task::spawn_blocking(move || {
        let seen = Cell::new(0u64);
        let frames = source.take(max_frames).inspect(|frame| {
            if let Ok(frame) = frame {
                seen.set(frame.detections.len() as u64);
            }
        });

        let result = processor.run_with(frames, &worker_token, |outcome, elapsed| {
            worker_metrics.record_frame(elapsed.as_secs_f64(), seen.get(), outcome.detections.len());
            for transition in &outcome.new_transitions {
                worker_metrics.record_transition(transition);
            }

            let snapshot = worker_snapshots.latest();
            worker_metrics.set_assigned_tracks(snapshot.assigned_tracks);
            if !outcome.new_transitions.is_empty() {
                for (i, count) in snapshot.totals.per_exit_zone.iter().enumerate() {
                    worker_metrics.set_exit_zone_total(&worker_zones.label(ExitZoneId(i)), *count);
                }
            }
        });

        (processor, result)
    });

    // Progress and shutdown
    let mut ticker = tokio::time::interval(Duration::from_millis(settings.progress_interval_ms.max(1)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut listening = true;
    let mut last_frame = None;

    let (processor, result) = loop {
        tokio::select! {
            joined = &mut worker => break joined.context("counting worker panicked")?,
            _ = ticker.tick() => {
                let snapshot = snapshots.latest();
                if snapshot.frame_index != last_frame {
                    last_frame = snapshot.frame_index;
                    info!(
                        "Progress: {} frames, {} tracks assigned, {} vehicles counted",
                        snapshot.frames_processed,
                        snapshot.assigned_tracks,
                        snapshot.totals.grand_total
                    );
                }
            }
            signal = &mut ctrl_c, if listening => {
                listening = false;
                match signal {
                    Ok(()) => {
                        info!("Received Ctrl+C, stopping after the current frame...");
                        token.cancel();
                    }
                    Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
                }
            }
        }
    };

    // Counts applied before an input error are still reported
    let totals = match &result {
        Ok(summary) => summary.totals.clone(),
        Err(e) => {
            error!("Stopped reading {}: {}", args.detections.display(), e);
            processor.totals()
        }
    };

    let stats = processor.stats();
    info!(
        "Processed {} frames: {} detections, {} labelled, {} transitions",
        stats.frames_processed,
        stats.detections_seen,
        stats.detections_labeled,
        stats.transitions_recorded
    );
    for (i, count) in totals.per_exit_zone.iter().enumerate() {
        info!("   {}: {}", settings.zones.label(ExitZoneId(i)), count);
    }
    info!("   Total: {}", totals.grand_total);
    debug!(
        "Transition breakdown:\n{}",
        report::format_breakdown(&processor.counter().transition_counts(), &settings.zones)
    );

    report::write_summary(&settings.summary_path, &totals, &settings.zones)?;

    if let Some(path) = &settings.metrics_path {
        let text = metrics.export()?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
        info!("Metrics written to {}", path.display());
    }

    let summary = result.with_context(|| format!("failed to read {}", args.detections.display()))?;
    if summary.cancelled {
        info!("Run {} cancelled", summary.run_id);
    } else {
        info!("Run {} complete", summary.run_id);
    }

    Ok(())
}

/// Initialize logging with tracing
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,traffic_counter=debug,traffic_count=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(filter)
        .init();
}
