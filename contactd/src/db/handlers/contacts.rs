//! Database repository for contact submissions.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::contacts::{ContactCreateDBRequest, ContactDBResponse, PathList},
};
use crate::types::{ContactId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub street: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub images: String,
    pub files: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Contact> for ContactDBResponse {
    type Error = DbError;

    fn try_from(contact: Contact) -> Result<Self> {
        Ok(Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            message: contact.message,
            street: contact.street,
            state: contact.state,
            zip: contact.zip,
            country: contact.country,
            images: PathList::decode(&contact.images)?,
            files: PathList::decode(&contact.files)?,
            created_at: contact.created_at,
        })
    }
}

pub struct Contacts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Contacts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Contacts<'c> {
    type CreateRequest = ContactCreateDBRequest;
    type Response = ContactDBResponse;
    type Id = ContactId;

    #[instrument(skip(self, request), fields(images = request.images.len(), files = request.files.len()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // id and created_at use database defaults
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (name, email, phone, message, street, state, zip, country, images, files)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.message)
        .bind(&request.street)
        .bind(&request.state)
        .bind(&request.zip)
        .bind(&request.country)
        .bind(request.images.encode())
        .bind(request.files.encode())
        .fetch_one(&mut *self.db)
        .await?;

        ContactDBResponse::try_from(contact)
    }

    #[instrument(skip(self), fields(contact_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        contact.map(ContactDBResponse::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}
