//! Database record structures.
//!
//! - [`contacts`]: contact submission records and the encoded path list type
//! - [`blob_storage`]: request/response types for the blob storage backends

pub mod blob_storage;
pub mod contacts;
