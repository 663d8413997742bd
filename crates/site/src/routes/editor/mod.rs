//! Inline editor for services and projects.
//!
//! Every handler takes [`RequireEditor`](crate::middleware::RequireEditor),
//! so anonymous requests never reach the datastore. Deletes go through a
//! confirmation page and only proceed when the form carries `confirm=yes`.

pub mod projects;
pub mod services;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::rejection::FormRejection,
    routing::{get, post},
};
use serde::Deserialize;

use crate::filters;
use crate::models::Flash;
use crate::state::AppState;

/// Flash shown when the record disappeared between page load and submit.
pub const GONE: &str = "العنصر غير موجود";

/// Delete confirmation form body.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: String,
}

impl DeleteForm {
    /// Whether the submission carries the explicit confirmation.
    ///
    /// A missing or unreadable body counts as unconfirmed.
    #[must_use]
    pub fn confirmed(form: &Result<Form<Self>, FormRejection>) -> bool {
        form.as_ref().is_ok_and(|Form(f)| f.confirm == "yes")
    }
}

/// Delete confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "editor/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub flashes: Vec<Flash>,
    pub question: &'static str,
    pub title: String,
    pub action: String,
    pub cancel_url: &'static str,
}

/// Create the editor routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", post(services::create))
        .route("/services/new", get(services::new_page))
        .route("/services/{id}", post(services::update))
        .route("/services/{id}/edit", get(services::edit_page))
        .route(
            "/services/{id}/delete",
            get(services::confirm_delete).post(services::delete),
        )
        .route("/projects", post(projects::create))
        .route("/projects/new", get(projects::new_page))
        .route("/projects/{id}", post(projects::update))
        .route("/projects/{id}/edit", get(projects::edit_page))
        .route(
            "/projects/{id}/delete",
            get(projects::confirm_delete).post(projects::delete),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explicit_yes_confirms() {
        let yes = Ok(Form(DeleteForm {
            confirm: "yes".to_string(),
        }));
        let no = Ok(Form(DeleteForm {
            confirm: "no".to_string(),
        }));
        let empty = Ok(Form(DeleteForm::default()));

        assert!(DeleteForm::confirmed(&yes));
        assert!(!DeleteForm::confirmed(&no));
        assert!(!DeleteForm::confirmed(&empty));
    }
}
