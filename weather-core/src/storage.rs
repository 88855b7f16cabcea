use async_trait::async_trait;
use bytes::Bytes;
use std::{fmt::Debug, sync::Arc};
use tracing::{info, warn};

use crate::{
    ArtifactKey, ArtifactMetadata,
    config::{StorageBackend, StorageConfig},
    error::StorageError,
};

pub mod cloud;
pub mod memory;

pub use cloud::CloudStore;
pub use memory::MemoryStore;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Durable home of stored artifacts.
///
/// Writes are whole-object: a reader sees either the complete blob or
/// nothing. There is no locking; concurrent writes to one key are
/// last-write-wins.
#[async_trait]
pub trait ArtifactStore: Send + Sync + Debug {
    async fn put(&self, key: &ArtifactKey, body: Bytes) -> Result<(), StorageError>;

    /// All artifacts whose key starts with `prefix` (every object when `None`),
    /// sorted by key.
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<ArtifactMetadata>, StorageError>;

    async fn get(&self, key: &ArtifactKey) -> Result<Bytes, StorageError>;
}

/// Construct the backend selected in the configuration.
pub fn store_from_config(config: &StorageConfig) -> Result<Arc<dyn ArtifactStore>, StorageError> {
    let store: Arc<dyn ArtifactStore> = match config.backend {
        StorageBackend::Gcs => {
            info!(bucket = %config.bucket, "using Google Cloud Storage backend");
            Arc::new(CloudStore::gcs(config)?)
        }
        StorageBackend::Mock => {
            warn!("using in-memory storage backend; stored data is lost on restart");
            Arc::new(MemoryStore::default())
        }
    };
    Ok(store)
}

fn matches_prefix(key: &str, prefix: Option<&str>) -> bool {
    prefix.is_none_or(|p| key.starts_with(p))
}
