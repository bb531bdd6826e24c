//! # contactd: marketing site server with a contact form endpoint
//!
//! `contactd` serves a small marketing site (home, services, about and contact pages) and the
//! `POST /api/contacts` endpoint behind its contact form. A submission is validated against a
//! declarative rule table, its image and file attachments are written to a public storage
//! directory, and one record is saved to PostgreSQL.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL (via sqlx) for persistence. An in-memory store can stand in for PostgreSQL
//! during development.
//!
//! ### Request Flow
//!
//! A `POST /api/contacts` body arrives as JSON, urlencoded or multipart. The
//! [`api::handlers::contacts::ContactForm`] extractor normalizes it into a
//! [`submission::ContactSubmission`] (raw field values plus ordered `images` and `files`
//! uploads) and hands it to the [`submission::SubmissionHandler`]. The handler runs
//! [`validation`], stores each upload through a [`db::handlers::BlobStorage`], and saves the
//! record through a [`db::handlers::ContactStore`]. Failures map to HTTP responses through
//! [`errors::Error`].
//!
//! Pages are rendered from templates embedded at build time ([`pages`]). Stored uploads are
//! served back from `storage.public_url_path` (default `/storage`).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use contactd::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = contactd::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     contactd::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod pages;
pub mod submission;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use crate::{
    config::{CorsOrigin, DatabaseConfig},
    db::handlers::{ContactStore, InMemoryContactStore, PostgresContactStore, blob_storage::create_blob_storage},
    openapi::ApiDoc,
    pages::Pages,
    submission::SubmissionHandler,
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{self, HeaderValue},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::ContactId;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .submissions(Arc::new(submissions))
///     .pages(Arc::new(pages))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub submissions: Arc<SubmissionHandler>,
    pub pages: Arc<Pages>,
}

/// Get the contactd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect the configured contact store, running migrations for PostgreSQL
async fn setup_contact_store(config: &Config) -> anyhow::Result<(Arc<dyn ContactStore>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::External { url, pool } => {
            info!("Using external database");
            let pool = pool.pool_options().connect(url).await?;
            migrator().run(&pool).await?;
            Ok((Arc::new(PostgresContactStore::new(pool.clone())), Some(pool)))
        }
        DatabaseConfig::Memory => {
            info!("Using in-memory contact store: submissions will be lost on shutdown");
            Ok((Arc::new(InMemoryContactStore::new()), None))
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::CONTENT_TYPE, http::header::ACCEPT])
        .allow_credentials(config.cors.allow_credentials);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: pages, the contact API, stored uploads, docs, and the
/// CORS, metrics and tracing layers.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let config = &state.config;

    let router = Router::new()
        .route("/", get(api::handlers::pages::home))
        .route("/services", get(api::handlers::pages::services))
        .route("/about", get(api::handlers::pages::about))
        .route("/contact", get(api::handlers::pages::contact))
        .route(
            "/api/contacts",
            post(api::handlers::contacts::create_contact).layer(DefaultBodyLimit::max(config.uploads.max_request_size)),
        )
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/healthz", get(|| async { "OK" }))
        .with_state(state.clone())
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()))
        .nest_service(&config.storage.public_url_path, ServeDir::new(&config.storage.public_root));

    let mut router = router.layer(create_cors_layer(config)?);

    if config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled service.
///
/// 1. **Create**: [`Application::new`] connects the contact store (running migrations),
///    prepares the storage directories and compiles the page templates
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting contactd with configuration: {:#?}", config);

        let (contacts, pool) = setup_contact_store(&config).await?;
        Self::with_contact_store(config, contacts, pool).await
    }

    /// Create an application around an existing contact store
    pub async fn with_contact_store(config: Config, contacts: Arc<dyn ContactStore>, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let blobs = create_blob_storage(&config.storage).await?;
        let pages = Pages::load(config.site.clone(), &config.uploads)?;
        let submissions = SubmissionHandler::new(contacts, blobs, &config.uploads);

        let app_state = AppState::builder()
            .config(config.clone())
            .submissions(Arc::new(submissions))
            .pages(Arc::new(pages))
            .build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("contactd listening on http://{}, available at http://localhost:{}", bind_addr, self.config.port);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils::{create_test_app, create_test_app_with_config, create_test_config};
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::Value;

    #[test_log::test(tokio::test)]
    async fn test_healthz() {
        let app = create_test_app().await;

        let response = app.server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_route_is_not_found() {
        let app = create_test_app().await;

        app.server.get("/nope").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_stored_uploads_are_served_publicly() {
        let app = create_test_app().await;

        let form = MultipartForm::new()
            .add_text("name", "A")
            .add_text("email", "a@example.com")
            .add_text("phone", "555")
            .add_text("message", "hi")
            .add_text("street", "1 Rd")
            .add_text("state", "CA")
            .add_text("zip", "90000")
            .add_text("country", "US")
            .add_part("files[]", Part::text("hello world").file_name("note.txt").mime_type("text/plain"));

        let response = app.server.post("/api/contacts").multipart(form).await;
        response.assert_status_ok();
        let body: Value = response.json();
        let files: Vec<String> = serde_json::from_str(body["data"]["files"].as_str().unwrap()).unwrap();

        let served = app.server.get(&format!("/storage/{}", files[0])).await;
        served.assert_status_ok();
        served.assert_text("hello world");

        app.server
            .get("/storage/../Cargo.toml")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_request_body_limit() {
        let app = create_test_app().await;
        let body = "x".repeat(app.config.uploads.max_request_size + 1);

        let response = app
            .server
            .post("/api/contacts")
            .content_type("application/x-www-form-urlencoded")
            .bytes(format!("message={body}").into_bytes().into())
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_preflight_for_configured_origin() {
        let storage = tempfile::tempdir().unwrap();
        let mut config = create_test_config(storage.path());
        config.cors.allowed_origins = vec![crate::config::CorsOrigin::Url("https://www.example.com".parse().unwrap())];
        let app = create_test_app_with_config(config, storage).await;

        let response = app
            .server
            .method(axum::http::Method::OPTIONS, "/api/contacts")
            .add_header(HeaderName::from_static("origin"), HeaderValue::from_static("https://www.example.com"))
            .add_header(
                HeaderName::from_static("access-control-request-method"),
                HeaderValue::from_static("POST"),
            )
            .await;

        assert_eq!(
            response.header("access-control-allow-origin"),
            HeaderValue::from_static("https://www.example.com")
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_metrics_endpoint_when_enabled() {
        let storage = tempfile::tempdir().unwrap();
        let mut config = create_test_config(storage.path());
        config.enable_metrics = true;
        let app = create_test_app_with_config(config, storage).await;

        app.server.get("/healthz").await.assert_status_ok();

        let response = app.server.get("/internal/metrics").await;
        response.assert_status_ok();
        assert!(response.text().contains("axum_http_requests"));
    }

    #[test_log::test(tokio::test)]
    async fn test_metrics_endpoint_absent_by_default() {
        let app = create_test_app().await;

        app.server
            .get("/internal/metrics")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
