//! Core types for the Social Culture site.

pub mod contact;
pub mod content;
pub mod draft;
pub mod email;
pub mod id;
pub mod ticket;

pub use contact::{ContactMessage, ContactMessageError};
pub use content::{Project, ProjectDetails, Service};
pub use draft::{
    DEFAULT_PROJECT_CATEGORY, DEFAULT_PROJECT_DURATION, DraftError, ProjectDraft, ProjectInput,
    ServiceDraft, ServiceInput,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use ticket::TicketId;
