//! HTTP request handlers.
//!
//! - [`contacts`]: contact form submission (`POST /api/contacts`)
//! - [`pages`]: the server-rendered site pages
//!
//! Handlers return [`crate::errors::Result`], which converts failures to a status code and a
//! JSON error body.

pub mod contacts;
pub mod pages;
