pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::BackendError;
