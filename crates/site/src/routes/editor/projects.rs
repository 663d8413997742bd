//! Project editor handlers.
//!
//! Besides title, description and image, the form edits the case study
//! details: category, duration, challenge, and the strategy and results
//! lists (one item per line).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use social_culture_core::{ProjectDraft, ProjectId, ProjectInput};

use super::{ConfirmDeleteTemplate, DeleteForm, GONE};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flashes, RequireEditor, add_flash};
use crate::models::Flash;
use crate::routes::projects::not_found;
use crate::state::AppState;
use crate::supabase::SupabaseError;

const BACK: &str = "/?tab=projects";

pub const MISSING_FIELDS: &str = "اكتبي العنوان والوصف";
pub const CREATED: &str = "تم إضافة المشروع ✅";
pub const UPDATED: &str = "تم تعديل المشروع ✏️";
pub const DELETED: &str = "تم الحذف 🗑";
pub const CONFIRM_QUESTION: &str = "متأكدة عايزة تحذفي المشروع؟";

/// Add/edit project form template.
#[derive(Template, WebTemplate)]
#[template(path = "editor/project_form.html")]
pub struct ProjectFormTemplate {
    pub flashes: Vec<Flash>,
    pub heading: &'static str,
    pub action: String,
    pub input: ProjectInput,
    pub error: Option<&'static str>,
}

impl ProjectFormTemplate {
    fn new_project(flashes: Vec<Flash>, input: ProjectInput) -> Self {
        Self {
            flashes,
            heading: "إضافة مشروع جديد",
            action: "/editor/projects".to_string(),
            input,
            error: None,
        }
    }

    fn edit_project(flashes: Vec<Flash>, id: ProjectId, input: ProjectInput) -> Self {
        Self {
            flashes,
            heading: "تعديل المشروع",
            action: format!("/editor/projects/{id}"),
            input,
            error: None,
        }
    }

    fn invalid(mut self) -> Response {
        self.error = Some(MISSING_FIELDS);
        (StatusCode::UNPROCESSABLE_ENTITY, self).into_response()
    }
}

/// GET /editor/projects/new
pub async fn new_page(_editor: RequireEditor, Flashes(flashes): Flashes) -> impl IntoResponse {
    ProjectFormTemplate::new_project(flashes, ProjectInput::new_project())
}

/// POST /editor/projects
#[instrument(skip_all)]
pub async fn create(
    RequireEditor(editor): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<ProjectInput>,
) -> Response {
    let Ok(draft) = ProjectDraft::try_from(&input) else {
        return ProjectFormTemplate::new_project(Vec::new(), input).invalid();
    };

    match state
        .supabase()
        .create_project(&editor.access_token, &draft)
        .await
    {
        Ok(()) => {
            add_breadcrumb("editor", "Created project", None);
            add_flash(&session, Flash::success(CREATED)).await;
            Redirect::to(BACK).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create project");
            ProjectFormTemplate::new_project(vec![Flash::error(e.user_message())], input)
                .into_response()
        }
    }
}

/// GET /editor/projects/{id}/edit
#[instrument(skip(_editor, state, flashes))]
pub async fn edit_page(
    _editor: RequireEditor,
    State(state): State<AppState>,
    Flashes(flashes): Flashes,
    Path(id): Path<ProjectId>,
) -> Result<Response, AppError> {
    Ok(match state.supabase().get_project(id).await? {
        Some(project) => {
            ProjectFormTemplate::edit_project(flashes, id, ProjectInput::from(&project))
                .into_response()
        }
        None => not_found(),
    })
}

/// POST /editor/projects/{id}
#[instrument(skip(editor, state, session, input))]
pub async fn update(
    RequireEditor(editor): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProjectId>,
    Form(input): Form<ProjectInput>,
) -> Response {
    let Ok(draft) = ProjectDraft::try_from(&input) else {
        return ProjectFormTemplate::edit_project(Vec::new(), id, input).invalid();
    };

    match state
        .supabase()
        .update_project(&editor.access_token, id, &draft)
        .await
    {
        Ok(()) => {
            add_breadcrumb(
                "editor",
                "Updated project",
                Some(&[("id", id.to_string().as_str())]),
            );
            add_flash(&session, Flash::success(UPDATED)).await;
            Redirect::to(BACK).into_response()
        }
        Err(SupabaseError::NotFound(_)) => {
            add_flash(&session, Flash::error(GONE)).await;
            Redirect::to(BACK).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update project");
            ProjectFormTemplate::edit_project(vec![Flash::error(e.user_message())], id, input)
                .into_response()
        }
    }
}

/// GET /editor/projects/{id}/delete
#[instrument(skip(_editor, state, flashes))]
pub async fn confirm_delete(
    _editor: RequireEditor,
    State(state): State<AppState>,
    Flashes(flashes): Flashes,
    Path(id): Path<ProjectId>,
) -> Result<Response, AppError> {
    Ok(match state.supabase().get_project(id).await? {
        Some(project) => ConfirmDeleteTemplate {
            flashes,
            question: CONFIRM_QUESTION,
            title: project.title,
            action: format!("/editor/projects/{id}/delete"),
            cancel_url: BACK,
        }
        .into_response(),
        None => not_found(),
    })
}

/// POST /editor/projects/{id}/delete
///
/// Without `confirm=yes` the request is sent back to the confirmation page.
#[instrument(skip(editor, state, session, form))]
pub async fn delete(
    RequireEditor(editor): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProjectId>,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> Redirect {
    if !DeleteForm::confirmed(&form) {
        return Redirect::to(&format!("/editor/projects/{id}/delete"));
    }

    match state
        .supabase()
        .delete_project(&editor.access_token, id)
        .await
    {
        Ok(()) => {
            add_breadcrumb(
                "editor",
                "Deleted project",
                Some(&[("id", id.to_string().as_str())]),
            );
            add_flash(&session, Flash::success(DELETED)).await;
        }
        Err(SupabaseError::NotFound(_)) => {
            add_flash(&session, Flash::error(GONE)).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete project");
            add_flash(&session, Flash::error(e.user_message())).await;
        }
    }

    Redirect::to(BACK)
}
