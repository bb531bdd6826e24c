//! Common type definitions.
//!
//! - [`ContactId`]: identifier of a stored contact submission
//! - [`Bucket`]: the public blob areas uploads are written to
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type ContactId = Uuid;

/// Public blob area an upload is stored into.
///
/// Each bucket is a top-level directory under the storage root, and its name is the first
/// segment of every reference path stored in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Images,
    Files,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Images, Bucket::Files];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Images => "images",
            Bucket::Files => "files",
        }
    }

    /// Resolve a form field name to a bucket.
    ///
    /// Accepts the bare slot name as well as the array forms browsers and HTTP clients send:
    /// `images`, `images[]`, `images[3]`.
    pub fn from_field_name(name: &str) -> Option<Self> {
        let base = match name.find('[') {
            Some(idx) if name.ends_with(']') => &name[..idx],
            Some(_) => return None,
            None => name,
        };
        Bucket::ALL.into_iter().find(|bucket| bucket.as_str() == base)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abbreviate a UUID to its first 8 characters for logging
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_from_field_name() {
        assert_eq!(Bucket::from_field_name("images"), Some(Bucket::Images));
        assert_eq!(Bucket::from_field_name("images[]"), Some(Bucket::Images));
        assert_eq!(Bucket::from_field_name("files[0]"), Some(Bucket::Files));
        assert_eq!(Bucket::from_field_name("name"), None);
        assert_eq!(Bucket::from_field_name("imagesx[]"), None);
        assert_eq!(Bucket::from_field_name("images[0"), None);
    }

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("12345678-aaaa-bbbb-cccc-1234567890ab").unwrap();
        assert_eq!(abbrev_uuid(&id), "12345678");
    }
}
