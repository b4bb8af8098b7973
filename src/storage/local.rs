use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{blob_name_from_reference, is_valid_blob_name, BlobError, BlobStore};

/// Filesystem-backed container. The directory is served publicly under
/// `public_base_url` by the router.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_base_url, name)
    }

    pub async fn ensure_container(&self) -> Result<(), BlobError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, BlobError> {
        if !is_valid_blob_name(name) {
            return Err(BlobError::InvalidReference(name.to_string()));
        }

        self.ensure_container().await?;
        fs::write(self.root.join(name), bytes).await?;

        tracing::debug!(blob = %name, content_type, size = bytes.len(), "Stored blob");
        Ok(self.public_url(name))
    }

    async fn delete(&self, reference: &str) -> Result<(), BlobError> {
        let name = blob_name_from_reference(reference)?;

        match fs::remove_file(self.root.join(&name)).await {
            Ok(()) => {
                tracing::debug!(blob = %name, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
