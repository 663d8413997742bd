//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame denial, etc.)
//! 5. Session layer (tower-sessions with in-memory store)
//! 6. Rate limiting (governor) on submission routes only

pub mod auth;
pub mod flash;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalEditor, RequireEditor, clear_current_editor, set_current_editor};
pub use flash::{Flashes, add_flash, keep_contact_draft, push_flash, take_contact_draft};
pub use rate_limit::submission_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
