//! Editor sign-in and sign-out.
//!
//! Passwords are checked by Supabase Auth; the site only keeps the returned
//! access token in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{
    Flashes, OptionalEditor, add_flash, clear_current_editor, set_current_editor,
};
use crate::models::{CurrentEditor, Flash};
use crate::state::AppState;
use crate::supabase::SupabaseError;

pub const SIGNED_IN: &str = "تم تسجيل الدخول 🔥";
pub const BAD_CREDENTIALS: &str = "بيانات الدخول غلط ❌";
pub const SIGN_IN_FAILED: &str = "حدث خطأ، حاول مرة أخرى";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<Flash>,
}

/// Display the login page. Signed-in editors go straight home.
pub async fn login_page(
    OptionalEditor(editor): OptionalEditor,
    Flashes(flashes): Flashes,
) -> Response {
    if editor.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate { flashes }.into_response()
}

/// Old login address.
pub async fn legacy_login() -> Redirect {
    Redirect::permanent(LOGIN_PATH)
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        add_flash(&session, Flash::error(BAD_CREDENTIALS)).await;
        return Redirect::to(LOGIN_PATH).into_response();
    }

    let auth = match state
        .supabase()
        .sign_in_with_password(email, &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(SupabaseError::InvalidCredentials) => {
            tracing::warn!("Login rejected");
            add_flash(&session, Flash::error(BAD_CREDENTIALS)).await;
            return Redirect::to(LOGIN_PATH).into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            add_flash(&session, Flash::error(SIGN_IN_FAILED)).await;
            return Redirect::to(LOGIN_PATH).into_response();
        }
    };

    let editor = CurrentEditor::from(&auth);
    if let Err(e) = set_current_editor(&session, &editor).await {
        tracing::error!(error = %e, "Failed to set session");
        add_flash(&session, Flash::error(SIGN_IN_FAILED)).await;
        return Redirect::to(LOGIN_PATH).into_response();
    }

    set_sentry_user(&editor.user_id, editor.email.as_deref());
    tracing::info!(user_id = %editor.user_id, "Editor signed in");
    add_flash(&session, Flash::success(SIGNED_IN)).await;
    Redirect::to("/").into_response()
}

/// Sign out: revoke the token at Supabase (best effort) and clear the session.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    match clear_current_editor(&session).await {
        Ok(Some(editor)) => {
            if let Err(e) = state.supabase().sign_out(&editor.access_token).await {
                tracing::warn!(error = %e, "Failed to revoke editor token");
            }
            tracing::info!(user_id = %editor.user_id, "Editor signed out");
        }
        Ok(None) => {}
        Err(e) => tracing::error!(error = %e, "Failed to clear session"),
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/")
}
