use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::catalog::{DatasetMetadata, METADATA_KEY};
use crate::domain::{Dataset, Row};
use crate::error::IngestError;
use crate::storage::MetadataStore;

/// Holds at most one uploaded dataset for the lifetime of a session.
///
/// `store` replaces the slot wholesale and writes a row-less metadata record to
/// the durable store. Reads never fail: no dataset means `None` or an empty
/// page.
#[derive(Debug)]
pub struct DatasetCache {
    slot: RwLock<Option<Arc<Dataset>>>,
    metadata: Arc<dyn MetadataStore>,
}

impl DatasetCache {
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            slot: RwLock::new(None),
            metadata,
        }
    }

    pub fn store(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        {
            let mut slot = self
                .slot
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *slot = Some(dataset.clone());
        }

        info!(
            "Cached dataset {} ({} rows, {} columns)",
            dataset.file_name,
            dataset.total_rows,
            dataset.headers.len()
        );

        if let Err(e) = self.persist_metadata(&dataset) {
            warn!(
                "Failed to persist metadata for {}; reload recovery unavailable: {}",
                dataset.file_name, e
            );
        }

        dataset
    }

    fn persist_metadata(&self, dataset: &Dataset) -> Result<(), IngestError> {
        let json = DatasetMetadata::from(dataset).to_json()?;
        self.metadata.set_item(METADATA_KEY, &json)
    }

    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// `rows[offset..offset + limit]`, clipped to what exists.
    pub fn page(&self, offset: usize, limit: usize) -> Vec<Row> {
        let Some(dataset) = self.get() else {
            return Vec::new();
        };

        if offset >= dataset.rows.len() {
            return Vec::new();
        }
        let end = offset.saturating_add(limit).min(dataset.rows.len());
        dataset.rows[offset..end].to_vec()
    }

    /// Drop the in-memory dataset but keep durable metadata, as a full reload
    /// would.
    pub fn reset_volatile(&self) {
        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = slot.take() {
            info!("Dropped cached rows for {}", previous.file_name);
        }
    }

    /// Last metadata record written by any session sharing the durable store.
    /// Missing or unreadable records come back as `None`.
    pub fn load_metadata(&self) -> Option<DatasetMetadata> {
        let raw = match self.metadata.get_item(METADATA_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read durable metadata: {}", e);
                return None;
            }
        };

        match DatasetMetadata::from_json(&raw) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Ignoring unreadable durable metadata: {}", e);
                None
            }
        }
    }
}
