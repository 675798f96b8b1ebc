use std::collections::HashMap;
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::IngestError;

/// String key-value store that outlives the volatile dataset cache.
pub trait MetadataStore: Debug + Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, IngestError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), IngestError>;
}

fn check_key(key: &str) -> Result<(), IngestError> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(IngestError::StorageError {
            message: format!("Invalid storage key: '{}'", key),
        });
    }
    Ok(())
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileMetadataStore {
    root: PathBuf,
}

impl FileMetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("Using durable metadata directory: {}", root.display());
        Self { root }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl MetadataStore for FileMetadataStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, IngestError> {
        check_key(key)?;
        let path = self.path_for(key);

        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IngestError::StorageError {
                message: format!("Failed to read {}: {}", path.display(), e),
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), IngestError> {
        check_key(key)?;
        std::fs::create_dir_all(&self.root).map_err(|e| IngestError::StorageError {
            message: format!("Failed to create {}: {}", self.root.display(), e),
        })?;

        let path = self.path_for(key);
        let staging = self.root.join(format!(".{}.tmp", key));

        std::fs::write(&staging, value).map_err(|e| IngestError::StorageError {
            message: format!("Failed to write {}: {}", staging.display(), e),
        })?;
        std::fs::rename(&staging, &path).map_err(|e| IngestError::StorageError {
            message: format!("Failed to replace {}: {}", path.display(), e),
        })?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Process-local store. An optional quota rejects oversized writes the way a
/// browser's storage does when it is full.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, IngestError> {
        check_key(key)?;
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), IngestError> {
        check_key(key)?;
        if let Some(quota) = self.quota_bytes {
            if key.len() + value.len() > quota {
                return Err(IngestError::StorageError {
                    message: format!(
                        "Quota exceeded: {} bytes requested, {} allowed",
                        key.len() + value.len(),
                        quota
                    ),
                });
            }
        }

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
