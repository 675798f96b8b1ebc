pub mod cache;
pub mod catalog;
pub mod config;
pub mod csv_parser;
pub mod domain;
pub mod engine;
pub mod error;
pub mod session;
pub mod storage;

pub use cache::DatasetCache;
pub use catalog::{DatasetMetadata, METADATA_KEY};
pub use domain::{Dataset, Row};
pub use engine::IngestEngine;
pub use error::IngestError;
pub use session::ExploreState;
