//! Contact route handlers.
//!
//! `POST /api/contact` is the JSON endpoint; `POST /contact` is the landing
//! page form, answered with a redirect back to the contact section.

use axum::{
    Form, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::middleware::{add_flash, keep_contact_draft};
use crate::models::{ContactDraft, Flash};
use crate::services::contact::{self, ContactError, ContactSubmission};
use crate::state::AppState;

/// Where the form submission lands after the redirect.
const CONTACT_SECTION: &str = "/#contact";

pub const MISSING_FIELDS: &str = "من فضلك املأ جميع الحقول";
pub const SENT: &str = "تم إرسال الرسالة بنجاح 🚀";
pub const FAILED: &str = "حدث خطأ، حاول مرة أخرى";

/// Generic JSON error for failures whose details stay server-side.
const INTERNAL_ERROR: &str = "Internal server error";

/// JSON contact request body.
#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Response for the JSON endpoint.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ContactResponse {
    Success { success: bool },
    Error { error: String },
}

impl ContactResponse {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

/// Landing page form body.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// Honeypot; hidden from people, filled in by bots.
    #[serde(default)]
    pub company: String,
}

impl ContactForm {
    fn submission(&self) -> ContactSubmission<'_> {
        ContactSubmission {
            name: &self.name,
            email: &self.email,
            message: &self.message,
        }
    }

    fn has_empty_field(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .any(|field| field.trim().is_empty())
    }

    fn draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
        }
    }
}

/// Submit a contact message as JSON.
///
/// POST /api/contact
///
/// The body is decoded as JSON whatever its `Content-Type`; browser `fetch`
/// calls without headers send `text/plain`. An undecodable body answers 500
/// with a JSON error like every other failing step.
#[instrument(skip_all, fields(email = tracing::field::Empty))]
pub async fn submit_json(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let request: ContactRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable contact request body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactResponse::error(INTERNAL_ERROR)),
            );
        }
    };
    tracing::Span::current().record("email", request.email.as_str());

    let submission = ContactSubmission {
        name: &request.name,
        email: &request.email,
        message: &request.message,
    };

    match contact::submit(&state, submission).await {
        Ok(ticket) => {
            tracing::info!(ticket = %ticket, "Contact message handled");
            (StatusCode::OK, Json(ContactResponse::Success { success: true }))
        }
        Err(ContactError::Invalid(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ContactResponse::error(e.to_string())),
        ),
        Err(ContactError::Persist(e)) => {
            tracing::error!(error = %e, "Failed to store contact message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactResponse::error(e.user_message())),
            )
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Contact flow failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactResponse::error(INTERNAL_ERROR)),
            )
        }
    }
}

/// Submit the landing page contact form.
///
/// POST /contact
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn submit_form(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Response {
    if !form.company.is_empty() {
        tracing::info!("Honeypot filled, dropping contact submission");
        return Redirect::to(CONTACT_SECTION).into_response();
    }

    if form.has_empty_field() {
        add_flash(&session, Flash::error(MISSING_FIELDS)).await;
        keep_contact_draft(&session, &form.draft()).await;
        return Redirect::to(CONTACT_SECTION).into_response();
    }

    match contact::submit(&state, form.submission()).await {
        Ok(ticket) => {
            tracing::info!(ticket = %ticket, "Contact message handled");
            add_flash(&session, Flash::success(SENT)).await;
        }
        Err(e) => {
            if !matches!(e, ContactError::Invalid(_)) {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Contact flow failed");
            }
            add_flash(&session, Flash::error(FAILED)).await;
            keep_contact_draft(&session, &form.draft()).await;
        }
    }

    Redirect::to(CONTACT_SECTION).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::post};
    use lettre::transport::stub::AsyncStubTransport;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::state::test_support::state_for;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/contact", post(submit_json))
            .with_state(state)
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        post_raw(app, "application/json", body.to_string()).await
    }

    async fn post_raw(app: Router, content_type: &str, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/contact")
                    .header("content-type", content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        let transport = AsyncStubTransport::new_ok();

        let (status, body) = post_json(
            app(state_for(&server, transport.clone())),
            json!({ "name": "Mona", "email": "mona@brand.com", "message": "Hi" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
        assert_eq!(transport.messages().await.len(), 2);
    }

    #[tokio::test]
    async fn test_json_body_sent_as_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let transport = AsyncStubTransport::new_ok();

        let (status, body) = post_raw(
            app(state_for(&server, transport.clone())),
            "text/plain;charset=UTF-8",
            json!({ "name": "Mona", "email": "mona@brand.com", "message": "Hi" }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
        assert_eq!(transport.messages().await.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let transport = AsyncStubTransport::new_ok();

        let (status, body) = post_raw(
            app(state_for(&server, transport.clone())),
            "application/json",
            "{not json".to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
        assert!(transport.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_json_missing_field_is_bad_request() {
        let server = MockServer::start().await;

        let (status, body) = post_json(
            app(state_for(&server, AsyncStubTransport::new_ok())),
            json!({ "name": "Mona", "email": "mona@brand.com" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "message is required" }));
    }

    #[tokio::test]
    async fn test_json_persist_failure_returns_datastore_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "value too long for type character varying(255)"
            })))
            .mount(&server)
            .await;

        let (status, body) = post_json(
            app(state_for(&server, AsyncStubTransport::new_ok())),
            json!({ "name": "Mona", "email": "mona@brand.com", "message": "Hi" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "value too long for type character varying(255)" })
        );
    }

    #[tokio::test]
    async fn test_json_mail_failure_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let (status, body) = post_json(
            app(state_for(&server, AsyncStubTransport::new_error())),
            json!({ "name": "Mona", "email": "mona@brand.com", "message": "Hi" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[test]
    fn test_form_empty_field_detection() {
        let form = ContactForm {
            name: "Mona".to_string(),
            email: " ".to_string(),
            message: "Hi".to_string(),
            company: String::new(),
        };
        assert!(form.has_empty_field());
    }
}
