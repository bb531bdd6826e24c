use crate::db::{
    errors::{StorageError, StorageResult},
    models::blob_storage::{BlobStorageRequest, BlobStorageResponse},
};
use crate::types::Bucket;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Trait for public blob storage backends
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store a payload in the given bucket under a generated unique name and return its
    /// reference path
    async fn store(&self, bucket: Bucket, request: BlobStorageRequest) -> StorageResult<BlobStorageResponse>;

    /// Delete a blob using its reference path. Deleting a missing blob is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;
}

/// Generate a unique reference path for an upload: `<bucket>/<uuid>[.<ext>]`
pub fn generate_storage_key(bucket: Bucket, request: &BlobStorageRequest) -> String {
    let id = uuid::Uuid::new_v4().simple();
    match guess_extension(request) {
        Some(ext) => format!("{bucket}/{id}.{ext}"),
        None => format!("{bucket}/{id}"),
    }
}

/// Extension from the client filename, falling back to the declared content type
fn guess_extension(request: &BlobStorageRequest) -> Option<String> {
    let from_name = request
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.or_else(|| {
        request
            .content_type
            .as_deref()
            .and_then(mime_guess::get_mime_extensions_str)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    })
}

// ============================================================================
// Local Filesystem Storage Implementation
// ============================================================================

/// Local filesystem storage backend - stores blobs under a public root directory, one
/// subdirectory per bucket
pub struct LocalBlobStorage {
    base_path: PathBuf,
}

impl LocalBlobStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Map a reference path to a location under the root, rejecting anything that is not
    /// exactly `<bucket>/<name>`
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let invalid = || StorageError::InvalidKey {
            key: storage_key.to_string(),
        };

        let mut components = Path::new(storage_key).components();
        let bucket = match components.next() {
            Some(Component::Normal(s)) => s.to_str().ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        if !Bucket::ALL.iter().any(|b| b.as_str() == bucket) {
            return Err(invalid());
        }
        let name = match components.next() {
            Some(Component::Normal(s)) => s,
            _ => return Err(invalid()),
        };
        if components.next().is_some() {
            return Err(invalid());
        }

        Ok(self.base_path.join(bucket).join(name))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn store(&self, bucket: Bucket, request: BlobStorageRequest) -> StorageResult<BlobStorageResponse> {
        let relative_path = generate_storage_key(bucket, &request);
        let full_path = self.resolve(&relative_path)?;

        // Ensure bucket directory exists
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = write_blob(&full_path, &request.content).await {
            // A partial file has no key the caller could clean up with
            if let Err(remove_err) = fs::remove_file(&full_path).await
                && remove_err.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(storage_key = %relative_path, error = %remove_err, "Failed to remove partial blob");
            }
            return Err(e.into());
        }

        tracing::debug!(
            storage_key = %relative_path,
            size_bytes = request.content.len(),
            "Stored blob"
        );

        Ok(BlobStorageResponse {
            storage_key: relative_path,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let full_path = self.resolve(storage_key)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_blob(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

// ============================================================================
// Factory
// ============================================================================

/// Create the blob storage backend described by the storage configuration
pub async fn create_blob_storage(config: &crate::config::StorageConfig) -> StorageResult<Arc<dyn BlobStorage>> {
    tracing::info!("Creating local blob storage backend (path: {:?})", config.public_root);
    for bucket in Bucket::ALL {
        fs::create_dir_all(config.public_root.join(bucket.as_str())).await.map_err(|e| {
            StorageError::Other(anyhow::anyhow!(
                "Failed to create storage directory {:?}: {}",
                config.public_root.join(bucket.as_str()),
                e
            ))
        })?;
    }
    Ok(Arc::new(LocalBlobStorage::new(config.public_root.clone())))
}
