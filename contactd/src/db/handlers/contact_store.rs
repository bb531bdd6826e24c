//! Persistence seam used by the submission flow.
//!
//! [`ContactStore`] is what request handling depends on. [`PostgresContactStore`] runs the
//! [`Contacts`] repository inside a transaction; [`InMemoryContactStore`] keeps records in
//! process memory and is used by tests and by `database.type: memory` deployments.

use crate::db::{
    errors::Result,
    handlers::{contacts::Contacts, repository::Repository},
    models::contacts::{ContactCreateDBRequest, ContactDBResponse},
};
use crate::types::ContactId;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage for contact submissions
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Persist a new submission. Every call creates a distinct record.
    async fn create(&self, request: &ContactCreateDBRequest) -> Result<ContactDBResponse>;

    /// Fetch a submission by ID
    async fn get(&self, id: ContactId) -> Result<Option<ContactDBResponse>>;

    /// Number of stored submissions
    async fn count(&self) -> Result<i64>;
}

// ============================================================================
// PostgreSQL Implementation
// ============================================================================

pub struct PostgresContactStore {
    pool: PgPool,
}

impl PostgresContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PostgresContactStore {
    async fn create(&self, request: &ContactCreateDBRequest) -> Result<ContactDBResponse> {
        let mut tx = self.pool.begin().await?;
        let contact = Contacts::new(&mut tx).create(request).await?;
        tx.commit().await?;
        Ok(contact)
    }

    async fn get(&self, id: ContactId) -> Result<Option<ContactDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Contacts::new(&mut conn).get_by_id(id).await
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        Contacts::new(&mut conn).count().await
    }
}

// ============================================================================
// In-memory Implementation
// ============================================================================

/// In-memory contact store. Records are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryContactStore {
    contacts: Arc<RwLock<Vec<ContactDBResponse>>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored records in insertion order
    pub async fn all(&self) -> Vec<ContactDBResponse> {
        self.contacts.read().await.clone()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn create(&self, request: &ContactCreateDBRequest) -> Result<ContactDBResponse> {
        let contact = ContactDBResponse::from_request(uuid::Uuid::new_v4(), request, Utc::now());
        self.contacts.write().await.push(contact.clone());
        Ok(contact)
    }

    async fn get(&self, id: ContactId) -> Result<Option<ContactDBResponse>> {
        Ok(self.contacts.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.contacts.read().await.len() as i64)
    }
}
