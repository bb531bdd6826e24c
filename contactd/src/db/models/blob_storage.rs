use bytes::Bytes;

/// Request to store an uploaded payload
#[derive(Debug, Clone)]
pub struct BlobStorageRequest {
    pub content: Bytes,
    /// Original client-side filename, used to keep the extension
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// Response from storing a payload
#[derive(Debug, Clone)]
pub struct BlobStorageResponse {
    /// Public reference path relative to the storage root (e.g. "images/3f2a...9c.png")
    pub storage_key: String,
}
