//! Contact form submission flow.
//!
//! One linear pass: validate, persist to `contact_messages`, notify the
//! owner, then send the auto-reply. Any failing step ends the flow; nothing
//! is retried or rolled back.

use thiserror::Error;
use tracing::instrument;

use social_culture_core::{ContactMessage, ContactMessageError, TicketId};

use super::email::EmailError;
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Errors from submitting a contact message.
#[derive(Debug, Error)]
pub enum ContactError {
    /// A field is missing or the address is malformed.
    #[error("Invalid submission: {0}")]
    Invalid(#[from] ContactMessageError),

    /// The message could not be stored.
    #[error("Failed to store message: {0}")]
    Persist(#[from] SupabaseError),

    /// A notification or auto-reply could not be sent.
    #[error("Failed to send email: {0}")]
    Email(#[from] EmailError),
}

/// Raw contact fields as submitted.
#[derive(Debug, Clone, Copy)]
pub struct ContactSubmission<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Run the full contact flow and return the ticket quoted to the sender.
///
/// # Errors
///
/// Returns `ContactError::Invalid` before any side effect when a field is
/// empty or the address is malformed, otherwise the error of the first
/// failing step.
#[instrument(skip(state, submission), fields(email = %submission.email))]
pub async fn submit(
    state: &AppState,
    submission: ContactSubmission<'_>,
) -> Result<TicketId, ContactError> {
    let contact = ContactMessage::parse(submission.name, submission.email, submission.message)?;
    let ticket = TicketId::now();

    state.supabase().insert_contact_message(&contact).await?;
    tracing::info!(ticket = %ticket, "Contact message stored");

    state.email().send_contact_notification(&contact).await?;
    state
        .email()
        .send_auto_reply(&contact, &ticket, &state.whatsapp_url())
        .await?;

    Ok(ticket)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lettre::transport::stub::AsyncStubTransport;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::state::test_support::state_for;

    const SUBMISSION: ContactSubmission<'static> = ContactSubmission {
        name: "Mona",
        email: "mona@brand.com",
        message: "Need a growth plan",
    };

    #[tokio::test]
    async fn test_submit_stores_and_sends_both_emails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .and(body_json(json!({
                "name": "Mona",
                "email": "mona@brand.com",
                "message": "Need a growth plan"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let transport = AsyncStubTransport::new_ok();
        let state = state_for(&server, transport.clone());

        let ticket = submit(&state, SUBMISSION).await.unwrap();

        assert!(ticket.as_str().starts_with(TicketId::PREFIX));
        let messages = transport.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].0.to()[0].to_string(), "owner@socialculture.agency");
        assert_eq!(messages[1].0.to()[0].to_string(), "mona@brand.com");
    }

    #[tokio::test]
    async fn test_invalid_submission_has_no_side_effects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let transport = AsyncStubTransport::new_ok();
        let state = state_for(&server, transport.clone());

        let err = submit(
            &state,
            ContactSubmission {
                message: "   ",
                ..SUBMISSION
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ContactError::Invalid(ContactMessageError::MissingField("message"))
        ));
        assert!(transport.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_skips_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "new row violates row-level security policy"
            })))
            .mount(&server)
            .await;

        let transport = AsyncStubTransport::new_ok();
        let state = state_for(&server, transport.clone());

        let err = submit(&state, SUBMISSION).await.unwrap_err();

        let ContactError::Persist(inner) = err else {
            panic!("expected persist error, got {err:?}");
        };
        assert_eq!(
            inner.user_message(),
            "new row violates row-level security policy"
        );
        assert!(transport.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_mail_failure_after_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let state = state_for(&server, AsyncStubTransport::new_error());

        let err = submit(&state, SUBMISSION).await.unwrap_err();
        assert!(matches!(err, ContactError::Email(_)));
    }
}
