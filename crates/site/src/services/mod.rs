//! Business services for the site.

pub mod contact;
pub mod email;

pub use contact::{ContactError, ContactSubmission};
pub use email::{EmailError, EmailService};
