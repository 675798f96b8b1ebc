use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::DatasetCache;
use crate::config::IngestConfig;
use crate::csv_parser::{parse_csv, validate_upload, ParseLimits};
use crate::domain::{Dataset, Row};
use crate::error::IngestError;
use crate::session::ExploreState;
use crate::storage::{FileMetadataStore, MetadataStore};

/// Upload → explore workflow over one [`DatasetCache`].
#[derive(Debug)]
pub struct IngestEngine {
    cache: DatasetCache,
    limits: ParseLimits,
}

impl IngestEngine {
    pub fn new(config: &IngestConfig) -> Self {
        let store = Arc::new(FileMetadataStore::new(config.metadata_dir.clone()));
        Self::with_store(config.limits, store)
    }

    pub fn with_store(limits: ParseLimits, store: Arc<dyn MetadataStore>) -> Self {
        Self {
            cache: DatasetCache::new(store),
            limits,
        }
    }

    /// Read, parse and cache a CSV from disk. On any error the previously
    /// cached dataset stays in place.
    pub async fn upload_file(&self, path: &Path) -> Result<Arc<Dataset>, IngestError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| IngestError::InvalidFormat {
                file_name: path.display().to_string(),
            })?
            .to_string();

        info!("Uploading dataset from {}", path.display());

        let size_bytes = tokio::fs::metadata(path).await?.len();
        validate_upload(&file_name, size_bytes, &self.limits)?;

        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes);
        if matches!(text, std::borrow::Cow::Owned(_)) {
            warn!("{} is not valid UTF-8; invalid sequences were replaced", file_name);
        }

        self.upload_text(&file_name, &text, bytes.len() as u64)
    }

    /// Parse and cache CSV text already held in memory, e.g. a request body.
    pub fn upload_text(
        &self,
        file_name: &str,
        text: &str,
        size_bytes: u64,
    ) -> Result<Arc<Dataset>, IngestError> {
        match parse_csv(text, file_name, size_bytes, &self.limits) {
            Ok(dataset) => Ok(self.cache.store(dataset)),
            Err(e) => {
                warn!("Rejected upload {}: {}", file_name, e);
                Err(e)
            }
        }
    }

    pub fn explore(&self) -> ExploreState {
        ExploreState::resolve(&self.cache)
    }

    pub fn page(&self, offset: usize, limit: usize) -> Vec<Row> {
        self.cache.page(offset, limit)
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn limits(&self) -> &ParseLimits {
        &self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryMetadataStore;

    fn engine() -> IngestEngine {
        IngestEngine::with_store(
            ParseLimits::default(),
            Arc::new(InMemoryMetadataStore::new()),
        )
    }

    #[test]
    fn failed_upload_keeps_previous_dataset() {
        let engine = engine();
        engine.upload_text("good.csv", "a,b\n1,2\n", 8).unwrap();

        assert!(engine.upload_text("bad.txt", "a,b\n3,4\n", 8).is_err());
        assert!(engine.upload_text("empty.csv", "\n\n", 2).is_err());

        let current = engine.cache().get().unwrap();
        assert_eq!(current.file_name, "good.csv");
        assert_eq!(engine.page(0, 10)[0].values, vec!["1", "2"]);
    }

    #[test]
    fn oversized_upload_stores_nothing() {
        let engine = IngestEngine::with_store(
            ParseLimits {
                max_upload_bytes: 4,
            },
            Arc::new(InMemoryMetadataStore::new()),
        );

        let err = engine.upload_text("big.csv", "a,b\n1,2\n", 8).unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { .. }));
        assert!(engine.cache().get().is_none());
        assert!(engine.cache().load_metadata().is_none());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_failure() {
        let engine = engine();
        let err = engine
            .upload_file(Path::new("/definitely/not/here.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::ReadFailure { .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        std::fs::write(&path, b"name,city\nJos\xE9,Oslo\n").unwrap();

        let engine = engine();
        let dataset = engine.upload_file(&path).await.unwrap();

        assert_eq!(dataset.total_rows, 1);
        assert_eq!(dataset.value(&dataset.rows[0], "name"), Some("Jos\u{FFFD}"));
        assert_eq!(dataset.value(&dataset.rows[0], "city"), Some("Oslo"));
        assert_eq!(dataset.file_size_bytes, 20);
    }
}
