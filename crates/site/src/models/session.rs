//! Session-related types.
//!
//! Types stored in the session for the editor gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::supabase::AuthSession;

/// Session-stored editor identity.
///
/// Its presence is what unlocks the inline editor; the access token is
/// forwarded on every datastore write. Implements `Debug` manually to redact
/// the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentEditor {
    /// Supabase Auth user id.
    pub user_id: String,
    /// Editor's email address, when Supabase reports one.
    pub email: Option<String>,
    /// Bearer token for authenticated writes.
    pub access_token: String,
    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl CurrentEditor {
    /// Whether the access token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the access token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl From<&AuthSession> for CurrentEditor {
    fn from(session: &AuthSession) -> Self {
        Self {
            user_id: session.user.id.clone(),
            email: session.user.email.clone(),
            access_token: session.access_token().to_string(),
            expires_at: session.expires_at,
        }
    }
}

impl std::fmt::Debug for CurrentEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentEditor")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the signed-in editor.
    pub const CURRENT_EDITOR: &str = "current_editor";

    /// Key for pending flash messages.
    pub const FLASH: &str = "flash";

    /// Key for contact form values kept after a failed submission.
    pub const CONTACT_DRAFT: &str = "contact_draft";
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn editor(expires_at: DateTime<Utc>) -> CurrentEditor {
        CurrentEditor {
            user_id: "8d0f6c1e".to_string(),
            email: Some("owner@socialculture.agency".to_string()),
            access_token: "jwt-token".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!editor(now + Duration::minutes(5)).is_expired_at(now));
        assert!(editor(now).is_expired_at(now));
        assert!(editor(now - Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", editor(Utc::now()));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("jwt-token"));
    }
}
