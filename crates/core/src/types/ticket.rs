//! Contact ticket ids.

use core::fmt;

use chrono::{DateTime, Utc};

/// Reference number quoted back to a client in the auto-reply email.
///
/// Formatted as `SC-<unix milliseconds>` at the moment the message arrived.
/// Not persisted and not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketId(String);

impl TicketId {
    /// Prefix shared by every ticket id.
    pub const PREFIX: &'static str = "SC-";

    /// Ticket id for a message received at `at`.
    #[must_use]
    pub fn at(at: DateTime<Utc>) -> Self {
        Self(format!("{}{}", Self::PREFIX, at.timestamp_millis()))
    }

    /// Ticket id for a message received now.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
