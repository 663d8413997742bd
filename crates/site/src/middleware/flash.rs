//! Flash messages and kept form values, carried in the session across a
//! post/redirect/get round trip.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{ContactDraft, Flash, session_keys};

/// Queue a flash message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<Flash> = session.get(session_keys::FLASH).await?.unwrap_or_default();
    pending.push(flash);
    session.insert(session_keys::FLASH, pending).await
}

/// Queue a flash message, logging instead of failing if the session store
/// rejects it.
pub async fn add_flash(session: &Session, flash: Flash) {
    if let Err(e) = push_flash(session, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Extractor that drains pending flash messages from the session.
///
/// Messages are removed as they are read, so each shows exactly once.
pub struct Flashes(pub Vec<Flash>);

impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flashes = match parts.extensions.get::<Session>() {
            Some(session) => session
                .remove::<Vec<Flash>>(session_keys::FLASH)
                .await
                .ok()
                .flatten()
                .unwrap_or_default(),
            None => Vec::new(),
        };

        Ok(Self(flashes))
    }
}

/// Keep the contact form values for the next render of the landing page.
pub async fn keep_contact_draft(session: &Session, draft: &ContactDraft) {
    if let Err(e) = session.insert(session_keys::CONTACT_DRAFT, draft).await {
        tracing::warn!(error = %e, "Failed to keep contact form values");
    }
}

/// Take the kept contact form values, leaving an empty form behind.
pub async fn take_contact_draft(session: &Session) -> ContactDraft {
    session
        .remove::<ContactDraft>(session_keys::CONTACT_DRAFT)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}
