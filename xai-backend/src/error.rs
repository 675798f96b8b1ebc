use thiserror::Error;
use xai_ingest::IngestError;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{detail}")]
    RequestFailed { status: u16, detail: String },

    #[error("Invalid backend URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl From<url::ParseError> for BackendError {
    fn from(err: url::ParseError) -> Self {
        BackendError::InvalidUrl {
            message: err.to_string(),
        }
    }
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::RequestFailed { status, .. } => Some(*status),
            BackendError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
