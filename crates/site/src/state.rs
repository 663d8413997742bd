//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::services::{EmailError, EmailService};
use crate::supabase::SupabaseClient;

/// Greeting pre-filled in WhatsApp links on the landing page.
const WHATSAPP_GREETING: &str = "مرحباً أرغب في بدء مشروع معكم";

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the Supabase client, the mailer and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    supabase: SupabaseClient,
    email: EmailService,
}

impl AppState {
    /// Create application state from configuration, connecting the SMTP
    /// mailer.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay or owner address is invalid.
    pub fn new(config: SiteConfig) -> Result<Self, EmailError> {
        let supabase = SupabaseClient::new(&config.supabase);
        let email = EmailService::new(&config.email)?;
        Ok(Self::with_services(config, supabase, email))
    }

    /// Create application state from already-built services.
    #[must_use]
    pub fn with_services(config: SiteConfig, supabase: SupabaseClient, email: EmailService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                email,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the Supabase client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Plain `wa.me` link to the agency's WhatsApp number.
    #[must_use]
    pub fn whatsapp_url(&self) -> String {
        format!("https://wa.me/{}", self.inner.config.whatsapp_number)
    }

    /// WhatsApp link with the project-inquiry greeting filled in.
    #[must_use]
    pub fn whatsapp_inquiry_url(&self) -> String {
        format!(
            "{}?text={}",
            self.whatsapp_url(),
            urlencoding::encode(WHATSAPP_GREETING)
        )
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::config_for;
    use super::*;

    #[test]
    fn test_whatsapp_links() {
        let config = config_for("http://localhost:54321");
        let supabase = SupabaseClient::new(&config.supabase);
        let email = EmailService::stub(
            "owner@socialculture.agency",
            lettre::transport::stub::AsyncStubTransport::new_ok(),
        )
        .expect("valid owner address");
        let state = AppState::with_services(config, supabase, email);

        assert_eq!(state.whatsapp_url(), "https://wa.me/201011405879");
        let inquiry = state.whatsapp_inquiry_url();
        assert!(inquiry.starts_with("https://wa.me/201011405879?text="));
        assert!(!inquiry.contains(' '));
    }
}
