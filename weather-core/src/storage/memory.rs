use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{ArtifactKey, ArtifactMetadata, error::StorageError};

use super::{ArtifactStore, matches_prefix};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

/// Process-local artifact store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<ArtifactKey, StoredObject>>,
}

impl MemoryStore {
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(&self, key: &ArtifactKey, body: Bytes) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut objects = self.objects.write().await;

        let created = objects.get(key).map_or(now, |o| o.created);
        objects.insert(key.clone(), StoredObject { body, created, updated: now });
        Ok(())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<ArtifactMetadata>, StorageError> {
        let objects = self.objects.read().await;

        Ok(objects
            .iter()
            .filter(|(key, _)| matches_prefix(key.as_str(), prefix))
            .map(|(key, o)| ArtifactMetadata {
                key: key.clone(),
                size: o.body.len() as u64,
                created: Some(o.created),
                updated: Some(o.updated),
            })
            .collect())
    }

    async fn get(&self, key: &ArtifactKey) -> Result<Bytes, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip() {
        let store = MemoryStore::default();
        let key = ArtifactKey::from("weather_data_a.json");
        let body = Bytes::from_static(b"{\"a\":[1,2,3]}");

        store.put(&key, body.clone()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), body);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryStore::default();
        let err = store.get(&ArtifactKey::from("weather_data_a.json")).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn overwrite_is_last_write_wins() {
        let store = MemoryStore::default();
        let key = ArtifactKey::from("weather_data_a.json");

        store.put(&key, Bytes::from_static(b"{\"v\":1}")).await.unwrap();
        store.put(&key, Bytes::from_static(b"{\"v\":22}")).await.unwrap();

        assert_eq!(store.get(&key).await.unwrap(), Bytes::from_static(b"{\"v\":22}"));

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size, 8);
        assert!(listed[0].created <= listed[0].updated);
    }

    #[tokio::test]
    async fn listing_is_sorted_and_filtered() {
        let store = MemoryStore::default();
        for key in ["weather_data_c.json", "other.json", "weather_data_a.json"] {
            store.put(&ArtifactKey::from(key), Bytes::from_static(b"{}")).await.unwrap();
        }

        let first = store.list(Some("weather_data_")).await.unwrap();
        let keys: Vec<&str> = first.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["weather_data_a.json", "weather_data_c.json"]);

        assert_eq!(store.list(Some("weather_data_")).await.unwrap(), first);
    }
}
