use std::time::Duration;

use crate::error::BackendError;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, BackendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("XAI_BACKEND_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let timeout_secs = match lookup("XAI_BACKEND_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| BackendError::ConfigError {
                    message: format!("Invalid XAI_BACKEND_TIMEOUT_SECS '{}': {}", raw, e),
                })?,
        };

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_backend() {
        let config = BackendConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, BackendConfig::default());
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn reads_overrides_and_rejects_bad_timeout() {
        let config = BackendConfig::from_lookup(|key| match key {
            "XAI_BACKEND_URL" => Some("http://ml.internal:9000".to_string()),
            "XAI_BACKEND_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url, "http://ml.internal:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));

        let err = BackendConfig::from_lookup(|key| {
            (key == "XAI_BACKEND_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, BackendError::ConfigError { .. }));
    }
}
