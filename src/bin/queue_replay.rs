//! Replay a recorded tracking log through the dwell tracker and print the
//! resulting person records as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use queue_dwell::integration::JsonLinesSource;
use queue_dwell::{
    InMemoryRepository, PersonRecord, PersonRepository, QueueConfig, QueuePipeline, ZoneMasks,
};

#[derive(Debug, Parser)]
#[command(
    name = "queue-replay",
    about = "Replay tracked detections through the queue dwell tracker"
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines log of tracked detections, one frame per line
    #[arg(short, long)]
    detections: PathBuf,

    /// SQLite database to write records to (overrides the config)
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    database: Option<PathBuf>,

    /// Print one JSON report per frame before the records
    #[arg(long)]
    frames: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => QueueConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => QueueConfig::default(),
    };

    let zones = ZoneMasks::from_config(&config.zones, config.frame_width, config.frame_height);

    #[cfg(feature = "sqlite")]
    if let Some(db) = args.database.as_ref().or(config.database.as_ref()) {
        let repository = queue_dwell::persistence::SqliteRepository::open(db)
            .with_context(|| format!("opening database {}", db.display()))?;
        return replay(&args, &config, zones, repository);
    }

    replay(&args, &config, zones, InMemoryRepository::new())
}

fn replay<R: PersonRepository>(
    args: &Args,
    config: &QueueConfig,
    zones: ZoneMasks,
    repository: R,
) -> Result<()> {
    let source = JsonLinesSource::open(&args.detections)
        .with_context(|| format!("opening {}", args.detections.display()))?;
    let mut pipeline = QueuePipeline::new(source, zones, repository, config.tracker.clone());

    let print_frames = args.frames;
    let summary = pipeline.run_with(|report| {
        if print_frames {
            match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::warn!(error = %err, "failed to encode frame report"),
            }
        }
    })?;
    info!(frames = summary.frames, people = summary.track_ids.len(), "replay finished");

    let tracker = pipeline.into_tracker();
    let mut records: Vec<PersonRecord> = Vec::with_capacity(summary.track_ids.len());
    for &track_id in &summary.track_ids {
        if let Some(record) = tracker.repository().find_by_track_id(track_id)? {
            records.push(record);
        }
    }
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
