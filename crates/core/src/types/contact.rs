//! Contact form submissions.

use serde::Serialize;

use crate::types::email::{Email, EmailError};

/// Errors from validating a contact submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactMessageError {
    /// A required field was empty after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The sender's email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// A validated contact message, serialized as the `contact_messages` insert
/// payload. The datastore stamps `created_at` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub message: String,
}

impl ContactMessage {
    /// Validate raw form values.
    ///
    /// # Errors
    ///
    /// Returns [`ContactMessageError::MissingField`] for the first empty field
    /// (checked in form order: name, email, message), or
    /// [`ContactMessageError::InvalidEmail`] if the address is malformed.
    pub fn parse(name: &str, email: &str, message: &str) -> Result<Self, ContactMessageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactMessageError::MissingField("name"));
        }
        if email.trim().is_empty() {
            return Err(ContactMessageError::MissingField("email"));
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(ContactMessageError::MissingField("message"));
        }

        Ok(Self {
            name: name.to_string(),
            email: Email::parse(email)?,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_message() {
        let msg = ContactMessage::parse(" Sara ", "sara@brand.com", " Need ads ").unwrap();
        assert_eq!(msg.name, "Sara");
        assert_eq!(msg.email.as_str(), "sara@brand.com");
        assert_eq!(msg.message, "Need ads");
    }

    #[test]
    fn test_parse_reports_first_missing_field() {
        assert_eq!(
            ContactMessage::parse("", "", ""),
            Err(ContactMessageError::MissingField("name"))
        );
        assert_eq!(
            ContactMessage::parse("Sara", "  ", "hi"),
            Err(ContactMessageError::MissingField("email"))
        );
        assert_eq!(
            ContactMessage::parse("Sara", "sara@brand.com", "\n"),
            Err(ContactMessageError::MissingField("message"))
        );
    }

    #[test]
    fn test_parse_rejects_bad_email() {
        assert!(matches!(
            ContactMessage::parse("Sara", "sara-at-brand", "hi"),
            Err(ContactMessageError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_insert_payload_shape() {
        let msg = ContactMessage::parse("Sara", "sara@brand.com", "hi").unwrap();
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({ "name": "Sara", "email": "sara@brand.com", "message": "hi" })
        );
    }
}
