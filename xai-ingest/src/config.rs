use std::path::PathBuf;
use std::str::FromStr;

use crate::csv_parser::{ParseLimits, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::IngestError;

const DEFAULT_METADATA_DIR: &str = ".xai-session";
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub limits: ParseLimits,
    pub metadata_dir: PathBuf,
    pub page_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            limits: ParseLimits::default(),
            metadata_dir: PathBuf::from(DEFAULT_METADATA_DIR),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, IngestError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| IngestError::ConfigError {
                message: format!("Invalid {} '{}': {}", key, value, e),
            }),
    }
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, IngestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, IngestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_upload_bytes = parse_var(
            "XAI_MAX_UPLOAD_BYTES",
            lookup("XAI_MAX_UPLOAD_BYTES"),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        let page_size = parse_var("XAI_PAGE_SIZE", lookup("XAI_PAGE_SIZE"), DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(IngestError::ConfigError {
                message: "XAI_PAGE_SIZE must be greater than zero".to_string(),
            });
        }

        let metadata_dir = lookup("XAI_METADATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_DIR));

        Ok(Self {
            limits: ParseLimits { max_upload_bytes },
            metadata_dir,
            page_size,
        })
    }
}
