//! Editor authentication extractors.
//!
//! The editor gate is the presence of an unexpired [`CurrentEditor`] in the
//! session. An expired token is dropped from the session on first sight and
//! treated exactly like a signed-out visitor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentEditor, session_keys};

/// Path anonymous visitors are sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in editor.
///
/// If no editor is signed in, HTML requests are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireEditor(editor): RequireEditor,
/// ) -> impl IntoResponse {
///     format!("Signed in as {}", editor.user_id)
/// }
/// ```
pub struct RequireEditor(pub CurrentEditor);

/// Error returned when an editor session is required but missing.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        current_editor(session).await.map(Self).ok_or_else(|| {
            if parts.uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally gets the signed-in editor.
///
/// Unlike `RequireEditor`, this does not reject anonymous visitors. Pages use
/// it to decide whether to render the edit controls.
pub struct OptionalEditor(pub Option<CurrentEditor>);

impl<S> FromRequestParts<S> for OptionalEditor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let editor = match parts.extensions.get::<Session>() {
            Some(session) => current_editor(session).await,
            None => None,
        };

        Ok(Self(editor))
    }
}

/// Read the editor from the session, discarding it if the token expired.
async fn current_editor(session: &Session) -> Option<CurrentEditor> {
    let editor: CurrentEditor = session
        .get(session_keys::CURRENT_EDITOR)
        .await
        .ok()
        .flatten()?;

    if editor.is_expired() {
        tracing::info!(user_id = %editor.user_id, "Editor token expired, signing out");
        if let Err(e) = session
            .remove::<CurrentEditor>(session_keys::CURRENT_EDITOR)
            .await
        {
            tracing::warn!(error = %e, "Failed to drop expired editor from session");
        }
        return None;
    }

    Some(editor)
}

/// Helper to store the signed-in editor in the session.
///
/// Rotates the session id first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_editor(
    session: &Session,
    editor: &CurrentEditor,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_EDITOR, editor).await
}

/// Helper to clear the editor from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_editor(
    session: &Session,
) -> Result<Option<CurrentEditor>, tower_sessions::session::Error> {
    session
        .remove::<CurrentEditor>(session_keys::CURRENT_EDITOR)
        .await
}
