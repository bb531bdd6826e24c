//! Database layer for data persistence and access.
//!
//! ```text
//! ┌──────────────────┐
//! │ SubmissionHandler│
//! └────────┬─────────┘
//!          │
//!          ↓
//! ┌──────────────────┐     ┌──────────────┐
//! │   ContactStore   │     │ BlobStorage  │
//! └────────┬─────────┘     └──────┬───────┘
//!          ↓                      ↓
//! ┌──────────────────┐     ┌──────────────┐
//! │ Contacts (repo)  │     │ public root  │
//! └────────┬─────────┘     └──────────────┘
//!          ↓
//! ┌──────────────────┐
//! │    PostgreSQL    │
//! └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository and storage implementations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database and storage error types
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/` directory.
//! The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! contactd::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
