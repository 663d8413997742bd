//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Landing page (?tab=services|projects)
//! GET  /projects/{id}           - Project case study
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (Supabase reachable)
//!
//! # Contact (rate limited)
//! POST /api/contact             - JSON submission
//! POST /contact                 - Form submission (redirects back with a flash)
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action (rate limited)
//! GET  /login                   - Redirect to /auth/login
//! POST /auth/logout             - Logout action
//!
//! # Editor (requires sign-in)
//! GET  /editor/services/new           - New service form
//! POST /editor/services               - Create service
//! GET  /editor/services/{id}/edit     - Edit service form
//! POST /editor/services/{id}          - Update service
//! GET  /editor/services/{id}/delete   - Delete confirmation
//! POST /editor/services/{id}/delete   - Delete service
//! (same set under /editor/projects)
//! ```

pub mod auth;
pub mod contact;
pub mod editor;
pub mod home;
pub mod projects;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::submission_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(submission_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the contact routes router.
///
/// Both submission endpoints draw from one per-IP budget.
pub fn contact_routes() -> Router<AppState> {
    let limiter = submission_rate_limiter();
    Router::new()
        .route(
            "/api/contact",
            post(contact::submit_json).layer(limiter.clone()),
        )
        .route("/contact", post(contact::submit_form).layer(limiter))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/projects/{id}", get(projects::show))
        .route("/login", get(auth::legacy_login))
        .merge(contact_routes())
        .nest("/auth", auth_routes())
        .nest("/editor", editor::routes())
        .fallback(projects::fallback)
}
