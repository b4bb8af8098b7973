use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{blob_name_from_reference, BlobError, BlobStore};

pub const MEMORY_BASE_URL: &str = "https://blobs.test/eventimages";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory container for tests. Deletes can be made to fail so callers'
/// best-effort cleanup paths can be exercised.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
    uploads: AtomicUsize,
    delete_attempts: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url_for(name: &str) -> String {
        format!("{}/{}", MEMORY_BASE_URL, name)
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_attempts(&self) -> usize {
        self.delete_attempts.load(Ordering::SeqCst)
    }

    pub async fn get(&self, name: &str) -> Option<StoredBlob> {
        self.blobs.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.blobs.read().await.contains_key(name)
    }

    pub async fn insert(&self, name: &str, bytes: &[u8]) -> String {
        self.blobs.write().await.insert(
            name.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: "application/octet-stream".to_string(),
            },
        );
        Self::url_for(name)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, BlobError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.blobs.write().await.insert(
            name.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(Self::url_for(name))
    }

    async fn delete(&self, reference: &str) -> Result<(), BlobError> {
        self.delete_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Backend("delete disabled".to_string()));
        }

        let name = blob_name_from_reference(reference)?;
        self.blobs.write().await.remove(&name);
        Ok(())
    }
}
