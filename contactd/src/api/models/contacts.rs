use crate::db::models::contacts::ContactDBResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Acknowledgment text returned for every saved submission
pub const CONTACT_SAVED_MESSAGE: &str = "Message sent successfully!";

/// Contact form fields. Sent as `multipart/form-data` (with attachments),
/// `application/x-www-form-urlencoded` or `application/json`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactRequest {
    /// At most 255 characters
    #[schema(example = "Ada Lovelace", max_length = 255)]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "+44 20 7946 0000")]
    pub phone: String,
    #[schema(example = "I'd like a quote for a new website.")]
    pub message: String,
    #[schema(example = "12 St James's Square")]
    pub street: String,
    #[schema(example = "London")]
    pub state: String,
    #[schema(example = "SW1Y 4LB")]
    pub zip: String,
    #[schema(example = "United Kingdom")]
    pub country: String,
    /// Image attachments, sent as repeated `images[]` parts
    #[schema(value_type = Option<Vec<String>>, format = Binary)]
    pub images: Option<Vec<String>>,
    /// File attachments, sent as repeated `files[]` parts
    #[schema(value_type = Option<Vec<String>>, format = Binary)]
    pub files: Option<Vec<String>>,
}

/// The saved submission as echoed back to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub street: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    /// JSON-encoded array of stored image paths, relative to the public storage root
    #[schema(example = r#"["images/3f2a0c5e9d8b4f7aa1b2c3d4e5f60718.png"]"#)]
    pub images: String,
    /// JSON-encoded array of stored file paths, relative to the public storage root
    #[schema(example = "[]")]
    pub files: String,
}

impl From<&ContactDBResponse> for ContactData {
    fn from(contact: &ContactDBResponse) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            message: contact.message.clone(),
            street: contact.street.clone(),
            state: contact.state.clone(),
            zip: contact.zip.clone(),
            country: contact.country.clone(),
            images: contact.images.encode(),
            files: contact.files.encode(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactCreatedResponse {
    #[schema(example = "Message sent successfully!")]
    pub message: String,
    pub data: ContactData,
}

impl ContactCreatedResponse {
    pub fn new(contact: &ContactDBResponse) -> Self {
        Self {
            message: CONTACT_SAVED_MESSAGE.to_string(),
            data: contact.into(),
        }
    }
}

/// Body of a 422 response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    #[schema(example = "The email field must be a valid email address. (and 1 more error)")]
    pub message: String,
    /// Failure messages keyed by field name
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Body of every other error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
