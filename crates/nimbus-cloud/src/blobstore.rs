//! Blob storage contract and an in-memory implementation

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Options for [`BlobStore::put_blob`]
///
/// An immutable value; [`PutOptions::NONE`] is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutOptions {
    /// Upload in parts (providers without multipart support ignore this)
    pub multipart: bool,
}

impl PutOptions {
    pub const NONE: PutOptions = PutOptions { multipart: false };

    pub fn builder() -> PutOptionsBuilder {
        PutOptionsBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct PutOptionsBuilder {
    multipart: bool,
}

impl PutOptionsBuilder {
    pub fn multipart(mut self) -> Self {
        self.multipart = true;
        self
    }

    pub fn build(self) -> PutOptions {
        PutOptions {
            multipart: self.multipart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub user_metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub user_metadata: BTreeMap<String, String>,
}

impl Blob {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: "application/octet-stream".to_string(),
            data: data.into(),
            user_metadata: BTreeMap::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_metadata.insert(key.into(), value.into());
        self
    }
}

/// A stored blob with its server-side metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub blob: Blob,
    pub metadata: BlobMetadata,
}

/// Container/blob operations of a storage provider
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns `false` when the container already existed
    async fn create_container(&self, container: &str) -> Result<bool>;

    async fn container_exists(&self, container: &str) -> Result<bool>;

    /// Store `blob`, replacing any previous one; returns the new ETag
    async fn put_blob(&self, container: &str, blob: Blob, options: &PutOptions) -> Result<String>;

    /// `None` when the blob does not exist
    async fn get_blob(&self, container: &str, name: &str) -> Result<Option<StoredBlob>>;

    /// Removing an absent blob is a no-op
    async fn remove_blob(&self, container: &str, name: &str) -> Result<()>;

    /// Metadata of every blob in `container`, sorted by name
    async fn list(&self, container: &str) -> Result<Vec<BlobMetadata>>;
}

/// Blob store kept in process memory
///
/// Every instance owns its own containers; nothing is shared between
/// instances.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    containers: RwLock<HashMap<String, BTreeMap<String, StoredBlob>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn no_container(container: &str) -> CloudError {
    CloudError::NotFound {
        operation: "blobstore".to_string(),
        target: container.to_string(),
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn create_container(&self, container: &str) -> Result<bool> {
        let mut containers = self.containers.write().await;
        if containers.contains_key(container) {
            return Ok(false);
        }
        containers.insert(container.to_string(), BTreeMap::new());
        tracing::debug!("Created container {}", container);
        Ok(true)
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        Ok(self.containers.read().await.contains_key(container))
    }

    async fn put_blob(&self, container: &str, blob: Blob, options: &PutOptions) -> Result<String> {
        let mut containers = self.containers.write().await;
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| no_container(container))?;

        let etag = uuid::Uuid::new_v4().to_string();
        let metadata = BlobMetadata {
            name: blob.name.clone(),
            content_type: blob.content_type.clone(),
            size: blob.data.len() as u64,
            etag: etag.clone(),
            last_modified: Utc::now(),
            user_metadata: blob.user_metadata.clone(),
        };
        tracing::debug!(
            "Put {}/{} ({} bytes, multipart: {})",
            container,
            blob.name,
            metadata.size,
            options.multipart
        );
        blobs.insert(blob.name.clone(), StoredBlob { blob, metadata });
        Ok(etag)
    }

    async fn get_blob(&self, container: &str, name: &str) -> Result<Option<StoredBlob>> {
        let containers = self.containers.read().await;
        let blobs = containers
            .get(container)
            .ok_or_else(|| no_container(container))?;
        Ok(blobs.get(name).cloned())
    }

    async fn remove_blob(&self, container: &str, name: &str) -> Result<()> {
        if let Some(blobs) = self.containers.write().await.get_mut(container) {
            blobs.remove(name);
        }
        Ok(())
    }

    async fn list(&self, container: &str) -> Result<Vec<BlobMetadata>> {
        let containers = self.containers.read().await;
        let blobs = containers
            .get(container)
            .ok_or_else(|| no_container(container))?;
        Ok(blobs.values().map(|b| b.metadata.clone()).collect())
    }
}
