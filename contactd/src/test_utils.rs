//! Test helpers: an application wired to an in-memory contact store and a temporary storage root.

use crate::{
    Application,
    config::{Config, DatabaseConfig, SiteConfig, StorageConfig, UploadLimitsConfig},
    db::handlers::InMemoryContactStore,
};
use axum_test::TestServer;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    /// The store behind the server, for asserting on saved submissions
    pub contacts: InMemoryContactStore,
    _storage: TempDir,
}

impl TestApp {
    /// Directory uploads are written to
    pub fn storage_root(&self) -> &Path {
        &self.config.storage.public_root
    }
}

pub fn create_test_config(storage_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        storage: StorageConfig {
            public_root: storage_dir.join("public"),
            ..Default::default()
        },
        uploads: UploadLimitsConfig {
            max_request_size: 64 * 1024,
            max_file_size: 4 * 1024,
            max_files_per_field: 3,
        },
        site: SiteConfig {
            name: "Test Site".to_string(),
            tagline: "Testing, testing".to_string(),
            contact_email: Some("hello@test.example".to_string()),
        },
        ..Default::default()
    }
}

pub async fn create_test_app() -> TestApp {
    let storage = tempfile::tempdir().expect("Failed to create storage directory");
    let config = create_test_config(storage.path());
    create_test_app_with_config(config, storage).await
}

/// Build a test app from a custom config. `storage` must outlive the app since the config's
/// storage root points into it.
pub async fn create_test_app_with_config(config: Config, storage: TempDir) -> TestApp {
    let contacts = InMemoryContactStore::new();
    let app = Application::with_contact_store(config.clone(), Arc::new(contacts.clone()), None)
        .await
        .expect("Failed to create application");

    TestApp {
        server: app.into_test_server(),
        config,
        contacts,
        _storage: storage,
    }
}
