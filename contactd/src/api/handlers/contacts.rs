//! Contact form submission endpoint.

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, State, multipart::Field},
    http::{StatusCode, header::CONTENT_TYPE},
};
use bytes::BytesMut;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::{
    AppState,
    api::models::contacts::{ContactCreatedResponse, ContactRequest, ErrorResponse, ValidationErrorResponse},
    errors::{Error, Result},
    submission::{ContactSubmission, Upload},
    types::Bucket,
};

/// A contact submission decoded from a JSON, urlencoded or multipart body
pub struct ContactForm(pub ContactSubmission);

impl FromRequest<AppState> for ContactForm {
    type Rejection = Error;

    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

        let submission = match mime.as_str() {
            "multipart/form-data" => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;
                read_multipart(multipart, state.config.uploads.max_file_size).await?
            }
            "application/x-www-form-urlencoded" => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;
                read_text_fields(pairs)
            }
            m if m == "application/json" || m.ends_with("+json") => {
                let Json(value) = Json::<Value>::from_request(req, state)
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;
                match value {
                    Value::Object(fields) => ContactSubmission::from_fields(fields),
                    _ => {
                        return Err(Error::BadRequest {
                            message: "Request body must be a JSON object".to_string(),
                        });
                    }
                }
            }
            _ => return Err(Error::UnsupportedMediaType { content_type }),
        };

        Ok(ContactForm(submission))
    }
}

/// Map an axum body rejection, keeping the body-limit case distinct
fn rejection(status: StatusCode, message: String) -> Error {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { message }
    } else {
        Error::BadRequest { message }
    }
}

/// Text-only form fields. A value sent under an upload slot name lands on that slot's field
/// so the array check reports it.
fn read_text_fields(pairs: Vec<(String, String)>) -> ContactSubmission {
    let mut fields = Map::new();
    for (name, value) in pairs {
        let key = match Bucket::from_field_name(&name) {
            Some(bucket) => bucket.as_str().to_string(),
            None => name,
        };
        fields.insert(key, Value::String(value));
    }
    ContactSubmission::from_fields(fields)
}

async fn read_multipart(mut multipart: Multipart, max_file_size: u64) -> Result<ContactSubmission> {
    let mut submission = ContactSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection(e.status(), format!("Failed to parse multipart data: {}", e.body_text())))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let bucket = Bucket::from_field_name(&name);
        let file_name = field.file_name().map(str::to_string);

        match (bucket, file_name) {
            (Some(bucket), Some(file_name)) => {
                let content_type = field.content_type().map(str::to_string);
                let content = read_upload(field, max_file_size).await?;

                // Browsers send an empty part for a file input left blank
                if file_name.is_empty() && content.is_empty() {
                    debug!(field = %name, "Skipping empty file part");
                    continue;
                }

                submission.uploads_mut(bucket).push(Upload {
                    file_name: (!file_name.is_empty()).then_some(file_name),
                    content_type,
                    content: content.freeze(),
                });
            }
            (Some(bucket), None) => {
                let text = read_text(field).await?;
                submission.fields.insert(bucket.as_str().to_string(), Value::String(text));
            }
            (None, Some(_)) => {
                debug!(field = %name, "Ignoring file part outside the upload slots");
            }
            (None, None) => {
                let text = read_text(field).await?;
                submission.fields.insert(name, Value::String(text));
            }
        }
    }

    Ok(submission)
}

/// Read one file part, failing as soon as it exceeds the per-upload limit
async fn read_upload(mut field: Field<'_>, max_file_size: u64) -> Result<BytesMut> {
    let mut content = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| rejection(e.status(), format!("Failed to read file chunk: {}", e.body_text())))?
    {
        if (content.len() + chunk.len()) as u64 > max_file_size {
            return Err(Error::PayloadTooLarge {
                message: format!("Uploaded file exceeds maximum allowed size of {max_file_size} bytes"),
            });
        }
        content.extend_from_slice(&chunk);
    }
    Ok(content)
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| rejection(e.status(), format!("Failed to read form field: {}", e.body_text())))
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "contacts",
    summary = "Submit the contact form",
    description = "Validate a contact form submission, store any attached images and files, and save it. \
        Also accepts application/json and application/x-www-form-urlencoded bodies, which cannot carry attachments.",
    request_body(content = ContactRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Submission saved", body = ContactCreatedResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 413, description = "Request or attachment too large", body = ErrorResponse),
        (status = 415, description = "Unsupported content type", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ValidationErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse),
    )
)]
#[instrument(skip_all)]
pub async fn create_contact(
    State(state): State<AppState>,
    ContactForm(submission): ContactForm,
) -> Result<Json<ContactCreatedResponse>> {
    let contact = state.submissions.submit(submission).await?;
    Ok(Json(ContactCreatedResponse::new(&contact)))
}

#[cfg(test)]
mod tests {
    use crate::db::handlers::ContactStore;
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{Value, json};

    fn valid_json() -> Value {
        json!({
            "name": "A",
            "email": "a@example.com",
            "phone": "555",
            "message": "hi",
            "street": "1 Rd",
            "state": "CA",
            "zip": "90000",
            "country": "US"
        })
    }

    fn valid_form() -> MultipartForm {
        let mut form = MultipartForm::new();
        if let Value::Object(fields) = valid_json() {
            for (name, value) in fields {
                form = form.add_text(name, value.as_str().unwrap_or_default().to_string());
            }
        }
        form
    }

    #[test_log::test(tokio::test)]
    async fn test_json_submission_succeeds() {
        let app = create_test_app().await;

        let response = app.server.post("/api/contacts").json(&valid_json()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Message sent successfully!");
        for (field, value) in valid_json().as_object().unwrap() {
            assert_eq!(&body["data"][field], value, "field {field}");
        }
        assert_eq!(body["data"]["images"], "[]");
        assert_eq!(body["data"]["files"], "[]");
        assert_eq!(app.contacts.count().await.unwrap(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_each_post_creates_a_record() {
        let app = create_test_app().await;

        app.server.post("/api/contacts").json(&valid_json()).await.assert_status_ok();
        app.server.post("/api/contacts").json(&valid_json()).await.assert_status_ok();

        assert_eq!(app.contacts.count().await.unwrap(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_email_is_rejected() {
        let app = create_test_app().await;
        let mut input = valid_json();
        input["email"] = json!("not-an-email");

        let response = app.server.post("/api/contacts").json(&input).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["message"], "The email field must be a valid email address.");
        assert_eq!(body["errors"]["email"][0], "The email field must be a valid email address.");
        assert_eq!(body["errors"].as_object().unwrap().len(), 1);
        assert_eq!(app.contacts.count().await.unwrap(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_fields_are_all_reported() {
        let app = create_test_app().await;

        let response = app.server.post("/api/contacts").json(&json!({ "name": "A" })).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        let errors = body["errors"].as_object().unwrap();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains_key("email"));
        assert!(!errors.contains_key("name"));
        assert_eq!(body["message"], "The email field is required. (and 6 more errors)");
    }

    #[test_log::test(tokio::test)]
    async fn test_overlong_name_is_rejected() {
        let app = create_test_app().await;
        let mut input = valid_json();
        input["name"] = json!("x".repeat(256));

        let response = app.server.post("/api/contacts").json(&input).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["errors"]["name"][0], "The name field must not be greater than 255 characters.");
    }

    #[test_log::test(tokio::test)]
    async fn test_json_body_must_be_an_object() {
        let app = create_test_app().await;

        let response = app.server.post("/api/contacts").json(&json!(["A"])).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_urlencoded_submission_succeeds() {
        let app = create_test_app().await;

        let response = app
            .server
            .post("/api/contacts")
            .form(&[
                ("name", "A"),
                ("email", "a@example.com"),
                ("phone", "555"),
                ("message", "hi"),
                ("street", "1 Rd"),
                ("state", "CA"),
                ("zip", "90000"),
                ("country", "US"),
            ])
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["email"], "a@example.com");
        assert_eq!(body["data"]["images"], "[]");
    }

    #[test_log::test(tokio::test)]
    async fn test_unsupported_content_type() {
        let app = create_test_app().await;

        let response = app
            .server
            .post("/api/contacts")
            .content_type("text/plain")
            .text("name=A")
            .await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test_log::test(tokio::test)]
    async fn test_multipart_uploads_are_stored_in_order() {
        let app = create_test_app().await;

        let form = valid_form()
            .add_part("images[]", Part::bytes(b"first".to_vec()).file_name("one.png").mime_type("image/png"))
            .add_part("images[]", Part::bytes(b"second".to_vec()).file_name("two.jpg").mime_type("image/jpeg"))
            .add_part("files[]", Part::bytes(b"%PDF".to_vec()).file_name("brief.pdf").mime_type("application/pdf"));

        let response = app.server.post("/api/contacts").multipart(form).await;

        response.assert_status_ok();
        let body: Value = response.json();

        let images: Vec<String> = serde_json::from_str(body["data"]["images"].as_str().unwrap()).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].starts_with("images/") && images[0].ends_with(".png"));
        assert!(images[1].starts_with("images/") && images[1].ends_with(".jpg"));
        assert_eq!(std::fs::read(app.storage_root().join(&images[0])).unwrap(), b"first");
        assert_eq!(std::fs::read(app.storage_root().join(&images[1])).unwrap(), b"second");

        let files: Vec<String> = serde_json::from_str(body["data"]["files"].as_str().unwrap()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("files/") && files[0].ends_with(".pdf"));

        let stored = app.contacts.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].images.iter().collect::<Vec<_>>(), images);
    }

    #[test_log::test(tokio::test)]
    async fn test_empty_file_parts_are_ignored() {
        let app = create_test_app().await;

        let form = valid_form()
            .add_part("images[]", Part::bytes(Vec::new()).file_name("").mime_type("application/octet-stream"));

        let response = app.server.post("/api/contacts").multipart(form).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["images"], "[]");
    }

    #[test_log::test(tokio::test)]
    async fn test_text_in_upload_slot_is_rejected() {
        let app = create_test_app().await;

        let form = valid_form().add_text("files", "not-a-file");

        let response = app.server.post("/api/contacts").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["errors"]["files"][0], "The files field must be an array.");
    }

    #[test_log::test(tokio::test)]
    async fn test_oversized_upload_is_rejected() {
        let app = create_test_app().await;
        let too_big = vec![0u8; app.config.uploads.max_file_size as usize + 1];

        let form = valid_form().add_part("files[]", Part::bytes(too_big).file_name("big.bin"));

        let response = app.server.post("/api/contacts").multipart(form).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(app.contacts.count().await.unwrap(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_multipart_stores_nothing() {
        let app = create_test_app().await;

        let form = MultipartForm::new()
            .add_text("email", "bad")
            .add_part("images[]", Part::bytes(b"img".to_vec()).file_name("a.png"));

        let response = app.server.post("/api/contacts").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(std::fs::read_dir(app.storage_root().join("images")).unwrap().next().is_none());
    }
}
