use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use xai_ingest::csv_parser::{validate_upload, ParseLimits};
use xai_ingest::IngestError;

use crate::error::BackendError;
use crate::models::{
    ErrorBody, ExplainRequest, ExplainResponse, FeedbackRequest, FeedbackResponse, TrainRequest,
    TrainResponse, UploadDataResponse,
};

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl {
                message: format!("{} cannot be used as a base URL", base_url),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        info!("Using ML backend at {}", base_url);
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: Response,
        operation: &str,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        error!("{} failed with status {}: {}", operation, status, detail);
        Err(BackendError::RequestFailed {
            status: status.as_u16(),
            detail,
        })
    }

    /// Sends CSV bytes as the multipart field `file`.
    pub async fn upload_data(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadDataResponse, BackendError> {
        info!("Uploading {} ({} bytes) to backend", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("upload-data")?)
            .multipart(form)
            .send()
            .await?;

        let upload: UploadDataResponse = Self::handle_response(response, "upload-data").await?;
        info!(
            "Backend accepted {} with {} columns",
            file_name,
            upload.columns.len()
        );
        Ok(upload)
    }

    /// Applies the same extension and size checks as local ingestion before
    /// anything is sent.
    pub async fn upload_file(
        &self,
        path: &Path,
        limits: &ParseLimits,
    ) -> Result<UploadDataResponse, BackendError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| IngestError::InvalidFormat {
                file_name: path.display().to_string(),
            })?
            .to_string();

        let size_bytes = tokio::fs::metadata(path)
            .await
            .map_err(IngestError::from)?
            .len();
        validate_upload(&file_name, size_bytes, limits)?;

        let bytes = tokio::fs::read(path).await.map_err(IngestError::from)?;
        self.upload_data(&file_name, bytes).await
    }

    pub async fn train(&self, request: &TrainRequest) -> Result<TrainResponse, BackendError> {
        info!(
            "Training {} on target '{}' with {} features",
            request.model_type,
            request.target_column,
            request.feature_columns.len()
        );

        let response = self
            .http
            .post(self.endpoint("train")?)
            .json(request)
            .send()
            .await?;

        let trained: TrainResponse = Self::handle_response(response, "train").await?;
        info!("Backend trained model {}", trained.model_id);
        Ok(trained)
    }

    pub async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse, BackendError> {
        info!(
            "Requesting explanation from model {} for {} fields",
            request.model_id,
            request.data_point.len()
        );

        let response = self
            .http
            .post(self.endpoint("explain")?)
            .json(request)
            .send()
            .await?;

        Self::handle_response(response, "explain").await
    }

    pub async fn feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, BackendError> {
        info!(
            "Sending rating {} for explanation {}",
            request.rating, request.explanation_id
        );

        let response = self
            .http
            .post(self.endpoint("feedback")?)
            .json(request)
            .send()
            .await?;

        Self::handle_response(response, "feedback").await
    }
}
