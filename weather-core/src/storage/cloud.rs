//! Artifact storage on a cloud object store (Google Cloud Storage in production).

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectMeta, ObjectStore, PutOptions,
    gcp::GoogleCloudStorageBuilder, path::Path,
};
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};

use crate::{ArtifactKey, ArtifactMetadata, config::StorageConfig, error::StorageError};

use super::{ArtifactStore, JSON_CONTENT_TYPE, matches_prefix};

pub struct CloudStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl CloudStore {
    /// Wrap an already-configured object store.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self { store, bucket: bucket.into() }
    }

    /// Connect to a GCS bucket, taking credentials from the environment
    /// unless a service account file is configured.
    pub fn gcs(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(&config.bucket);

        if let Some(ref path) = config.service_account_path {
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        let store = builder.build().map_err(StorageError::Backend)?;

        Ok(Self::new(Arc::new(store), config.bucket.clone()))
    }
}

impl fmt::Debug for CloudStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudStore").field("bucket", &self.bucket).finish_non_exhaustive()
    }
}

impl From<ObjectMeta> for ArtifactMetadata {
    fn from(meta: ObjectMeta) -> Self {
        // Artifacts are never rewritten, so the object's last modification
        // is also when it was created.
        Self {
            key: ArtifactKey::new(meta.location.to_string()),
            size: meta.size as u64,
            created: Some(meta.last_modified),
            updated: Some(meta.last_modified),
        }
    }
}

#[async_trait]
impl ArtifactStore for CloudStore {
    #[instrument(skip(self, key, body), fields(bucket = %self.bucket, key = %key))]
    async fn put(&self, key: &ArtifactKey, body: Bytes) -> Result<(), StorageError> {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, AttributeValue::from(JSON_CONTENT_TYPE));
        let opts = PutOptions { attributes, ..Default::default() };

        debug!(size = body.len(), "writing object");

        self.store
            .put_opts(&Path::from(key.as_str()), body.into(), opts)
            .await
            .map_err(|source| StorageError::Write { key: key.to_string(), source })?;

        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<ArtifactMetadata>, StorageError> {
        // object_store prefixes match whole path segments, so filter on the key string.
        let objects: Vec<ObjectMeta> =
            self.store.list(None).try_collect().await.map_err(StorageError::List)?;

        let mut listed: Vec<ArtifactMetadata> = objects
            .into_iter()
            .filter(|meta| matches_prefix(meta.location.as_ref(), prefix))
            .map(ArtifactMetadata::from)
            .collect();
        listed.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(count = listed.len(), "listed objects");
        Ok(listed)
    }

    #[instrument(skip(self, key), fields(bucket = %self.bucket, key = %key))]
    async fn get(&self, key: &ArtifactKey) -> Result<Bytes, StorageError> {
        let read_err = |source| StorageError::Read { key: key.to_string(), source };

        let result = match self.store.get(&Path::from(key.as_str())).await {
            Ok(r) => r,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(read_err(e)),
        };

        let bytes = result.bytes().await.map_err(read_err)?;
        debug!(size = bytes.len(), "read object");
        Ok(bytes)
    }
}
