//! OpenAPI documentation for the public API (`/api/*`).
//!
//! Served as JSON at `/api/openapi.json` and rendered with Scalar at `/api/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Contact API",
        description = "Contact form submissions for the marketing site. \
            Submissions are validated, attachments are written to public storage, and the saved record is echoed back."
    ),
    paths(api::handlers::contacts::create_contact),
    components(schemas(
        api::models::contacts::ContactRequest,
        api::models::contacts::ContactData,
        api::models::contacts::ContactCreatedResponse,
        api::models::contacts::ValidationErrorResponse,
        api::models::contacts::ErrorResponse,
    )),
    tags((name = "contacts", description = "Contact form submissions"))
)]
pub struct ApiDoc;
