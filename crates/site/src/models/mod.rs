//! Session-stored models for the site.

pub mod flash;
pub mod session;

pub use flash::{ContactDraft, Flash, FlashKind};
pub use session::{CurrentEditor, keys as session_keys};
