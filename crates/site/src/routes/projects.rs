//! Project case study route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use social_culture_core::{Project, ProjectId};

use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Client names shown under the case study.
pub const CLIENTS: &[&str] = &[
    "Saudi Fashion Co",
    "Riyadh Restaurant Group",
    "Elite Medical Clinic",
    "Gulf E-commerce",
    "Najd Coffee",
    "Smart Health Center",
];

/// Case study page template.
#[derive(Template, WebTemplate)]
#[template(path = "projects/show.html")]
pub struct ProjectTemplate {
    pub project: Project,
    pub clients: &'static [&'static str],
}

/// Page shown for unknown projects and unknown paths.
#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate;

/// Render the not-found page with a 404 status.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate).into_response()
}

/// Display a project case study.
///
/// Ids that are not numbers are treated like unknown ids.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(id) = id.parse::<ProjectId>() else {
        return Ok(not_found());
    };

    match state.supabase().get_project(id).await? {
        Some(project) => Ok(ProjectTemplate {
            project,
            clients: CLIENTS,
        }
        .into_response()),
        None => Ok(not_found()),
    }
}

/// Router fallback for unknown paths.
pub async fn fallback() -> Response {
    not_found()
}
