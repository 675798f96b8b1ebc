use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xai_backend::models::{ExplainRequest, ProblemType, TrainRequest};
use xai_backend::{BackendClient, BackendConfig};
use xai_ingest::config::IngestConfig;
use xai_ingest::IngestEngine;

/// Ingest a CSV locally, upload it to the ML backend and optionally train and
/// explain the first row.
#[derive(Debug, Parser)]
#[command(name = "xai-backend", version)]
struct Args {
    /// CSV file to upload.
    file: PathBuf,

    /// Train a model of this type after uploading, e.g. `random_forest`.
    #[arg(long, value_name = "MODEL_TYPE")]
    train: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xai_backend=debug,xai_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting XAI backend client v0.1.0");

    let Args { file, train } = Args::parse();

    let ingest_config = IngestConfig::from_env()?;
    let backend_config = BackendConfig::from_env()?;

    info!("Configuration loaded:");
    info!("  Backend URL: {}", backend_config.base_url);
    info!("  Timeout: {:?}", backend_config.timeout);

    let engine = IngestEngine::new(&ingest_config);
    let dataset = engine
        .upload_file(&file)
        .await
        .with_context(|| format!("Could not ingest {}", file.display()))?;

    let client = BackendClient::new(&backend_config.base_url, backend_config.timeout)?;
    info!("Uploading {} to {}", file.display(), client.base_url());
    let upload = client.upload_file(&file, engine.limits()).await?;

    info!("Backend columns: [{}]", upload.columns.join(", "));
    if upload.columns != dataset.headers {
        warn!(
            "Backend reports different columns than the local parse: [{}]",
            dataset.headers.join(", ")
        );
    }

    let Some(model_type) = train else {
        return Ok(());
    };

    let request =
        TrainRequest::with_default_split(&dataset, model_type, ProblemType::Classification)?;
    let trained = client.train(&request).await?;
    info!("Trained model {} ({} metrics)", trained.model_id, trained.metrics.len());

    let Some(first) = dataset.rows.first() else {
        warn!("{} has no rows to explain", dataset.file_name);
        return Ok(());
    };

    let explanation = client
        .explain(&ExplainRequest::for_row(&trained.model_id, &dataset, first))
        .await?;
    info!("SHAP base value {:.4}", explanation.shap.base_value);
    for (feature, value) in explanation.shap.ranked() {
        info!("  {:<24} {:+.4}", feature, value);
    }

    Ok(())
}
