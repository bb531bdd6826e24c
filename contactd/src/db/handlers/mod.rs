//! Repository and storage implementations.
//!
//! - [`Contacts`]: Postgres repository for contact submissions
//! - [`contact_store`]: the [`ContactStore`] seam with Postgres and in-memory backends
//! - [`blob_storage`]: the [`BlobStorage`] seam for uploaded images and files
//!
//! # Common Pattern
//!
//! ```ignore
//! use contactd::db::handlers::{Contacts, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Contacts::new(&mut tx);
//!
//!     let contact = repo.create(&create_request).await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod blob_storage;
pub mod contact_store;
pub mod contacts;
pub mod repository;

pub use blob_storage::{BlobStorage, LocalBlobStorage};
pub use contact_store::{ContactStore, InMemoryContactStore, PostgresContactStore};
pub use contacts::Contacts;
pub use repository::Repository;
