//! Database models for contact submissions.

use crate::db::errors::DbError;
use crate::types::ContactId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered list of stored blob reference paths.
///
/// Kept as a plain sequence in memory and turned into JSON text only where it crosses the
/// storage or response boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathList(Vec<String>);

impl PathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: String) {
        self.0.push(path);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Encode as JSON text, e.g. `["images/ab12.png"]`
    pub fn encode(&self) -> String {
        // Serializing a Vec<String> cannot fail
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    /// Decode from the JSON text written by [`PathList::encode`]
    pub fn decode(encoded: &str) -> Result<Self, DbError> {
        serde_json::from_str(encoded).map_err(|e| DbError::InvalidData {
            message: format!("stored path list is not a JSON string array: {e}"),
        })
    }
}

impl From<Vec<String>> for PathList {
    fn from(paths: Vec<String>) -> Self {
        Self(paths)
    }
}

impl<'a> IntoIterator for &'a PathList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Database request for creating a new contact submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCreateDBRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub street: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub images: PathList,
    pub files: PathList,
}

/// A stored contact submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDBResponse {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub street: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub images: PathList,
    pub files: PathList,
    pub created_at: DateTime<Utc>,
}

impl ContactDBResponse {
    /// Build the stored form of a create request
    pub fn from_request(id: ContactId, request: &ContactCreateDBRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            message: request.message.clone(),
            street: request.street.clone(),
            state: request.state.clone(),
            zip: request.zip.clone(),
            country: request.country.clone(),
            images: request.images.clone(),
            files: request.files.clone(),
            created_at,
        }
    }
}
