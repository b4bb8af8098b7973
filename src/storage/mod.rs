//! Image blob storage.
//!
//! Blobs live in a single flat container and are addressed by name. Callers
//! hold on to the public URL returned from [`BlobStore::upload`]; deletion
//! takes that URL back and resolves the blob name from its last path segment.

use async_trait::async_trait;
use thiserror::Error;

pub mod local;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use local::LocalBlobStore;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryBlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob reference: {0}")]
    InvalidReference(String),

    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob backend failed: {0}")]
    Backend(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `name`, replacing any blob with the same name,
    /// and returns the public URL of the stored blob.
    async fn upload(&self, name: &str, bytes: &[u8], content_type: &str)
        -> Result<String, BlobError>;

    /// Deletes the blob addressed by a URL previously returned from
    /// [`BlobStore::upload`]. Deleting a blob that does not exist succeeds.
    async fn delete(&self, reference: &str) -> Result<(), BlobError>;
}

/// Resolves the blob name from a public URL.
pub fn blob_name_from_reference(reference: &str) -> Result<String, BlobError> {
    let invalid = || BlobError::InvalidReference(reference.to_string());

    let url = url::Url::parse(reference).map_err(|_| invalid())?;
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .ok_or_else(invalid)?;

    if !is_valid_blob_name(name) {
        return Err(invalid());
    }

    Ok(name.to_string())
}

/// Flat names only: no separators, no relative components.
pub fn is_valid_blob_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('%')
}
