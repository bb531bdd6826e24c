//! Contact form submission flow: validate, store attachments, persist.
//!
//! [`SubmissionHandler::submit`] is transport-agnostic. The HTTP layer decodes whatever body
//! format arrived into a [`ContactSubmission`] and hands it over; everything after that
//! (rule checks, blob writes, the database insert, cleanup on failure) happens here.

use bytes::Bytes;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    config::UploadLimitsConfig,
    db::{
        handlers::{BlobStorage, ContactStore},
        models::{
            blob_storage::BlobStorageRequest,
            contacts::{ContactCreateDBRequest, ContactDBResponse},
        },
    },
    errors::Result,
    types::{Bucket, abbrev_uuid},
    validation::{self, CONTACT_RULES, ValidationErrors, trimmed},
};

/// A single uploaded file, as received
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl From<Upload> for BlobStorageRequest {
    fn from(upload: Upload) -> Self {
        BlobStorageRequest {
            content: upload.content,
            file_name: upload.file_name,
            content_type: upload.content_type,
        }
    }
}

/// A decoded submission: raw field values plus the two ordered upload slots
#[derive(Debug, Clone, Default)]
pub struct ContactSubmission {
    /// Scalar inputs as received. Kept as JSON values so type errors can be reported.
    pub fields: Map<String, Value>,
    pub images: Vec<Upload>,
    pub files: Vec<Upload>,
}

impl ContactSubmission {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn uploads(&self, bucket: Bucket) -> &[Upload] {
        match bucket {
            Bucket::Images => &self.images,
            Bucket::Files => &self.files,
        }
    }

    pub fn uploads_mut(&mut self, bucket: Bucket) -> &mut Vec<Upload> {
        match bucket {
            Bucket::Images => &mut self.images,
            Bucket::Files => &mut self.files,
        }
    }
}

pub struct SubmissionHandler {
    contacts: Arc<dyn ContactStore>,
    blobs: Arc<dyn BlobStorage>,
    max_files_per_field: usize,
}

impl SubmissionHandler {
    pub fn new(contacts: Arc<dyn ContactStore>, blobs: Arc<dyn BlobStorage>, limits: &UploadLimitsConfig) -> Self {
        Self {
            contacts,
            blobs,
            max_files_per_field: limits.max_files_per_field,
        }
    }

    /// Validate, store uploads into their buckets in order, and persist one record.
    ///
    /// Nothing is written when validation fails. If a blob write or the insert fails, blobs
    /// already written for this submission are deleted on a best-effort basis.
    #[instrument(skip_all, fields(images = submission.images.len(), files = submission.files.len()))]
    pub async fn submit(&self, submission: ContactSubmission) -> Result<ContactDBResponse> {
        self.validate(&submission)?;

        let ContactSubmission { fields, images, files } = submission;
        let request = ContactCreateDBRequest {
            name: trimmed(&fields, "name"),
            email: trimmed(&fields, "email"),
            phone: trimmed(&fields, "phone"),
            message: trimmed(&fields, "message"),
            street: trimmed(&fields, "street"),
            state: trimmed(&fields, "state"),
            zip: trimmed(&fields, "zip"),
            country: trimmed(&fields, "country"),
            images: Default::default(),
            files: Default::default(),
        };

        let mut written = Vec::new();
        let result = self.store_and_persist(request, images, files, &mut written).await;

        match &result {
            Ok(contact) => info!(
                contact_id = %abbrev_uuid(&contact.id),
                images = contact.images.len(),
                files = contact.files.len(),
                "Contact submission saved"
            ),
            Err(_) if !written.is_empty() => self.discard(&written).await,
            Err(_) => {}
        }

        result
    }

    fn validate(&self, submission: &ContactSubmission) -> std::result::Result<(), ValidationErrors> {
        let mut errors = validation::validate(CONTACT_RULES, &submission.fields).err().unwrap_or_default();

        for bucket in Bucket::ALL {
            if submission.uploads(bucket).len() > self.max_files_per_field {
                errors.add(
                    bucket.as_str(),
                    format!("The {bucket} field must not have more than {} items.", self.max_files_per_field),
                );
            }
        }

        errors.into_result()
    }

    async fn store_and_persist(
        &self,
        mut request: ContactCreateDBRequest,
        images: Vec<Upload>,
        files: Vec<Upload>,
        written: &mut Vec<String>,
    ) -> Result<ContactDBResponse> {
        for (bucket, uploads) in [(Bucket::Images, images), (Bucket::Files, files)] {
            for upload in uploads {
                let stored = self.blobs.store(bucket, upload.into()).await?;
                written.push(stored.storage_key.clone());
                match bucket {
                    Bucket::Images => request.images.push(stored.storage_key),
                    Bucket::Files => request.files.push(stored.storage_key),
                }
            }
        }

        Ok(self.contacts.create(&request).await?)
    }

    /// Remove blobs written for a submission that was not saved
    async fn discard(&self, storage_keys: &[String]) {
        for key in storage_keys {
            if let Err(e) = self.blobs.delete(key).await {
                warn!(storage_key = %key, error = %e, "Failed to remove blob of aborted submission");
            }
        }
    }
}
