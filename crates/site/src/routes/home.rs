//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use social_culture_core::{Project, Service};

use crate::filters;
use crate::middleware::{Flashes, OptionalEditor, take_contact_draft};
use crate::models::{ContactDraft, Flash};
use crate::state::AppState;

/// Which half of the tabbed section is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Services,
    Projects,
}

impl Tab {
    #[must_use]
    pub const fn is_services(self) -> bool {
        matches!(self, Self::Services)
    }

    #[must_use]
    pub const fn is_projects(self) -> bool {
        matches!(self, Self::Projects)
    }
}

/// Query parameters for the landing page.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Unknown values fall back to the services tab.
    #[serde(default, deserialize_with = "lenient_tab")]
    pub tab: Tab,
}

fn lenient_tab<'de, D>(deserializer: D) -> Result<Tab, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(match raw.as_str() {
        "projects" => Tab::Projects,
        _ => Tab::Services,
    })
}

/// A headline figure in the stats strip.
pub struct Stat {
    pub value: u32,
    pub label: &'static str,
}

/// Fixed figures shown under the hero.
pub static STATS: [Stat; 3] = [
    Stat {
        value: 120,
        label: "علامة تجارية ناجحة",
    },
    Stat {
        value: 45,
        label: "نمو في المبيعات",
    },
    Stat {
        value: 85,
        label: "نمو التفاعل الرقمي",
    },
];

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub flashes: Vec<Flash>,
    /// Whether the edit controls render.
    pub editor: bool,
    pub tab: Tab,
    pub stats: &'static [Stat],
    pub services: Vec<Service>,
    pub projects: Vec<Project>,
    pub contact: ContactDraft,
    pub whatsapp_url: String,
}

/// Display the landing page.
///
/// Datastore failures leave the affected list empty rather than failing the
/// whole page.
#[instrument(skip(state, session, editor, flashes))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalEditor(editor): OptionalEditor,
    Flashes(flashes): Flashes,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let services = state.supabase().list_services().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load services");
        Vec::new()
    });
    let projects = state.supabase().list_projects().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load projects");
        Vec::new()
    });

    HomeTemplate {
        flashes,
        editor: editor.is_some(),
        tab: query.tab,
        stats: &STATS,
        services,
        projects,
        contact: take_contact_draft(&session).await,
        whatsapp_url: state.whatsapp_inquiry_url(),
    }
}
