//! Service editor handlers.

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

use social_culture_core::{ServiceDraft, ServiceId, ServiceInput};

use super::{ConfirmDeleteTemplate, DeleteForm, GONE};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flashes, RequireEditor, add_flash};
use crate::models::Flash;
use crate::routes::projects::not_found;
use crate::state::AppState;
use crate::supabase::SupabaseError;

const BACK: &str = "/?tab=services";

pub const MISSING_FIELDS: &str = "اكتبي بيانات الخدمة";
pub const CREATED: &str = "تم إضافة الخدمة ✅";
pub const UPDATED: &str = "تم تعديل الخدمة ✏️";
pub const DELETED: &str = "تم حذف الخدمة 🗑";
pub const CONFIRM_QUESTION: &str = "متأكدة عايزة تحذفي الخدمة؟";

/// Add/edit service form template.
#[derive(Template, WebTemplate)]
#[template(path = "editor/service_form.html")]
pub struct ServiceFormTemplate {
    pub flashes: Vec<Flash>,
    pub heading: &'static str,
    pub action: String,
    pub input: ServiceInput,
    pub error: Option<&'static str>,
}

impl ServiceFormTemplate {
    fn new_service(flashes: Vec<Flash>, input: ServiceInput) -> Self {
        Self {
            flashes,
            heading: "إضافة خدمة جديدة",
            action: "/editor/services".to_string(),
            input,
            error: None,
        }
    }

    fn edit_service(flashes: Vec<Flash>, id: ServiceId, input: ServiceInput) -> Self {
        Self {
            flashes,
            heading: "تعديل الخدمة",
            action: format!("/editor/services/{id}"),
            input,
            error: None,
        }
    }

    fn invalid(mut self) -> Response {
        self.error = Some(MISSING_FIELDS);
        (StatusCode::UNPROCESSABLE_ENTITY, self).into_response()
    }
}

/// GET /editor/services/new
pub async fn new_page(_editor: RequireEditor, Flashes(flashes): Flashes) -> impl IntoResponse {
    ServiceFormTemplate::new_service(flashes, ServiceInput::default())
}

/// POST /editor/services
#[instrument(skip_all)]
pub async fn create(
    RequireEditor(editor): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<ServiceInput>,
) -> Response {
    let Ok(draft) = ServiceDraft::try_from(&input) else {
        return ServiceFormTemplate::new_service(Vec::new(), input).invalid();
    };

    match state
        .supabase()
        .create_service(&editor.access_token, &draft)
        .await
    {
        Ok(()) => {
            add_breadcrumb("editor", "Created service", None);
            add_flash(&session, Flash::success(CREATED)).await;
            Redirect::to(BACK).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create service");
            ServiceFormTemplate::new_service(vec![Flash::error(e.user_message())], input)
                .into_response()
        }
    }
}

/// GET /editor/services/{id}/edit
#[instrument(skip(_editor, state, flashes))]
pub async fn edit_page(
    _editor: RequireEditor,
    State(state): State<AppState>,
    Flashes(flashes): Flashes,
    Path(id): Path<ServiceId>,
) -> Result<Response, AppError> {
    Ok(match state.supabase().get_service(id).await? {
        Some(service) => {
            ServiceFormTemplate::edit_service(flashes, id, ServiceInput::from(&service))
                .into_response()
        }
        None => not_found(),
    })
}

/// POST /editor/services/{id}
#[instrument(skip(editor, state, session, input))]
pub async fn update(
    RequireEditor(editor): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ServiceId>,
    Form(input): Form<ServiceInput>,
) -> Response {
    let Ok(draft) = ServiceDraft::try_from(&input) else {
        return ServiceFormTemplate::edit_service(Vec::new(), id, input).invalid();
    };

    match state
        .supabase()
        .update_service(&editor.access_token, id, &draft)
        .await
    {
        Ok(()) => {
            add_breadcrumb(
                "editor",
                "Updated service",
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
            tracing::error!(error = %e, "Failed to update service");
            ServiceFormTemplate::edit_service(vec![Flash::error(e.user_message())], id, input)
                .into_response()
        }
    }
}

/// GET /editor/services/{id}/delete
#[instrument(skip(_editor, state, flashes))]
pub async fn confirm_delete(
    _editor: RequireEditor,
    State(state): State<AppState>,
    Flashes(flashes): Flashes,
    Path(id): Path<ServiceId>,
) -> Result<Response, AppError> {
    Ok(match state.supabase().get_service(id).await? {
        Some(service) => ConfirmDeleteTemplate {
            flashes,
            question: CONFIRM_QUESTION,
            title: service.title,
            action: format!("/editor/services/{id}/delete"),
            cancel_url: BACK,
        }
        .into_response(),
        None => not_found(),
    })
}

/// POST /editor/services/{id}/delete
///
/// Without `confirm=yes` the request is sent back to the confirmation page.
#[instrument(skip(editor, state, session, form))]
pub async fn delete(
    RequireEditor(editor): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ServiceId>,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> Redirect {
    if !DeleteForm::confirmed(&form) {
        return Redirect::to(&format!("/editor/services/{id}/delete"));
    }

    match state
        .supabase()
        .delete_service(&editor.access_token, id)
        .await
    {
        Ok(()) => {
            add_breadcrumb(
                "editor",
                "Deleted service",
                Some(&[("id", id.to_string().as_str())]),
            );
            add_flash(&session, Flash::success(DELETED)).await;
        }
        Err(SupabaseError::NotFound(_)) => {
            add_flash(&session, Flash::error(GONE)).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete service");
            add_flash(&session, Flash::error(e.user_message())).await;
        }
    }

    Redirect::to(BACK)
}
