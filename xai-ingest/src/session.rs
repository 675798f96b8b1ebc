use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::DatasetCache;
use crate::domain::Dataset;

/// What the explore step has to show, in order of preference.
#[derive(Debug, Clone)]
pub enum ExploreState {
    /// Neither tier holds an upload.
    Empty,
    /// Full dataset from the volatile cache; pagination available.
    Cached(Arc<Dataset>),
    /// Shell rebuilt from durable metadata after the rows were lost.
    MetadataOnly(Dataset),
    /// Built-in sample shown in place of `Empty`.
    SampleDisplayed(Dataset),
}

impl ExploreState {
    /// What the session actually holds: the volatile cache, then durable
    /// metadata, else `Empty`.
    pub fn from_cache(cache: &DatasetCache) -> Self {
        if let Some(dataset) = cache.get() {
            debug!("Explore view served from cached dataset {}", dataset.file_name);
            return ExploreState::Cached(dataset);
        }

        if let Some(metadata) = cache.load_metadata().filter(|m| m.has_data) {
            info!(
                "Row cache empty; showing metadata for {} ({} rows)",
                metadata.file_name, metadata.total_rows
            );
            return ExploreState::MetadataOnly(Dataset::from_metadata(metadata));
        }

        ExploreState::Empty
    }

    /// Like [`ExploreState::from_cache`] but shows the built-in sample instead
    /// of `Empty`.
    pub fn resolve(cache: &DatasetCache) -> Self {
        match Self::from_cache(cache) {
            ExploreState::Empty => {
                info!("No uploaded dataset found; showing the sample dataset");
                ExploreState::SampleDisplayed(Dataset::sample())
            }
            state => state,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            ExploreState::Empty => None,
            ExploreState::Cached(dataset) => Some(dataset.as_ref()),
            ExploreState::MetadataOnly(dataset) | ExploreState::SampleDisplayed(dataset) => {
                Some(dataset)
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.dataset().is_some_and(Dataset::is_degraded)
    }

    /// The user should upload again to get row access back.
    pub fn needs_reupload(&self) -> bool {
        matches!(self, ExploreState::MetadataOnly(_)) && self.is_degraded()
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExploreState::Empty => "empty",
            ExploreState::Cached(_) => "cached",
            ExploreState::MetadataOnly(_) => "metadata-only",
            ExploreState::SampleDisplayed(_) => "sample",
        }
    }
}
