use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xai_ingest::config::IngestConfig;
use xai_ingest::{ExploreState, IngestEngine};

/// Upload a CSV into the session cache and print a page of the explore view.
#[derive(Debug, Parser)]
#[command(name = "xai-ingest", version)]
struct Args {
    /// CSV file to upload. Without it the view is resolved from the session.
    file: Option<PathBuf>,

    /// First row to show.
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Rows to show; defaults to XAI_PAGE_SIZE.
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xai_ingest=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting XAI dataset ingest v0.1.0");

    let args = Args::parse();
    let config = IngestConfig::from_env()?;

    info!("Configuration loaded:");
    info!("  Max upload bytes: {}", config.limits.max_upload_bytes);
    info!("  Metadata dir: {}", config.metadata_dir.display());
    info!("  Page size: {}", config.page_size);

    let engine = IngestEngine::new(&config);

    if let Some(path) = &args.file {
        match engine.upload_file(path).await {
            Ok(dataset) => info!(
                "Uploaded {} ({} rows, {} bytes)",
                dataset.display_name(),
                dataset.total_rows,
                dataset.file_size_bytes
            ),
            Err(e) if e.is_upload_rejection() => {
                error!("Upload rejected: {}", e);
                return Err(e.into());
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                return Err(e).with_context(|| format!("Could not ingest {}", path.display()));
            }
        }
    }

    let state = engine.explore();
    let Some(dataset) = state.dataset() else {
        bail!("Explore view resolved to no dataset");
    };

    info!(
        "Explore view ({}): {} with columns [{}]",
        state.label(),
        dataset.display_name(),
        dataset.headers.join(", ")
    );

    if state.needs_reupload() {
        warn!(
            "{} rows of {} are no longer in memory; upload the file again to browse them",
            dataset.total_rows, dataset.file_name
        );
        return Ok(());
    }

    let limit = args.limit.unwrap_or(config.page_size);
    let rows = match &state {
        ExploreState::Cached(_) => engine.page(args.offset, limit),
        _ => dataset
            .rows
            .iter()
            .skip(args.offset)
            .take(limit)
            .cloned()
            .collect(),
    };

    for row in &rows {
        info!("{}", serde_json::Value::Object(dataset.record(row)));
    }
    info!(
        "Showing {} of {} rows from offset {}",
        rows.len(),
        dataset.total_rows,
        args.offset
    );

    Ok(())
}
