//! Supabase REST and Auth client.
//!
//! # Architecture
//!
//! - Supabase is the source of truth - NO local storage, direct API calls
//! - Tables are reached through PostgREST (`/rest/v1/{table}`)
//! - Password sign-in and sign-out go through GoTrue (`/auth/v1/...`)
//! - In-memory caching via `moka` for content reads (60 second TTL); every
//!   write through this client invalidates the cache
//!
//! Reads and contact-message inserts are made with the anon key. Editor
//! writes carry the signed-in editor's access token so the project's row
//! level security decides what is allowed.
//!
//! # Example
//!
//! ```rust,ignore
//! use social_culture_site::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase);
//!
//! let services = client.list_services().await?;
//! let session = client.sign_in_with_password("owner@brand.com", "pw").await?;
//! client.delete_service(session.access_token(), services[0].id).await?;
//! ```

mod auth;
mod cache;
mod rest;

pub use auth::{AuthSession, AuthUser};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;
use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Sign-in was rejected.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// No row matched (or row level security hid it).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SupabaseError {
    /// Message suitable for showing to the site owner.
    ///
    /// API errors carry the datastore's own message; transport failures are
    /// reduced to a generic line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::InvalidCredentials => "Invalid login credentials".to_string(),
            Self::NotFound(_) => "Record not found".to_string(),
            Self::Http(_) | Self::Parse(_) => "Datastore unavailable".to_string(),
        }
    }
}

/// Error body shapes returned by PostgREST (`message`) and GoTrue
/// (`msg` or `error_description`).
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

// =============================================================================
// SupabaseClient
// =============================================================================

/// Client for a Supabase project.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl SupabaseClient {
    /// Create a new Supabase client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(60))
            .build();

        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Check that the project answers on its REST endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the key.
    pub async fn ping(&self) -> Result<(), SupabaseError> {
        let url = self.rest_url("", &[])?;
        let response = self.request(Method::GET, url, None).send().await?;
        Self::check(response).await.map(|_| ())
    }

    /// Drop every cached content read.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Build a request with the project API key and a bearer token.
    ///
    /// Without an access token the anon key doubles as the bearer token,
    /// which is what the Supabase client libraries do for anonymous calls.
    fn request(&self, method: Method, url: Url, access_token: Option<&str>) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.inner.anon_key))
    }

    /// `{base}/rest/v1/{table}` with the given query pairs.
    fn rest_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        self.url(&format!("rest/v1/{table}"), query)
    }

    /// `{base}/auth/v1/{path}` with the given query pairs.
    fn auth_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        self.url(&format!("auth/v1/{path}"), query)
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        let mut url = Url::parse(&format!("{}/{path}", self.inner.base_url))
            .map_err(|e| SupabaseError::Parse(format!("invalid Supabase URL: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Turn a non-success response into a `SupabaseError::Api`.
    async fn check(response: Response) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or(body.msg)
            .or(body.error_description)
            .unwrap_or(text);

        Err(SupabaseError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        self.inner.cache.get(key).await
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use secrecy::SecretString;
    use wiremock::MockServer;

    use super::SupabaseClient;
    use crate::config::SupabaseConfig;

    pub const ANON_KEY: &str = "anon-test-key";

    pub fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: server.uri(),
            anon_key: SecretString::from(ANON_KEY),
        })
    }
}
