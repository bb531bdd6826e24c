//! HTTP layer: route handlers and request/response models.
//!
//! - **[`handlers`]**: Axum handlers for the pages and the contact API
//! - **[`models`]**: Request/response bodies documented with `utoipa`
//!
//! API documentation is available at `/api/docs` when the server is running.

pub mod handlers;
pub mod models;
