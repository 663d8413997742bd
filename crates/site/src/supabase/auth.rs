//! Password sign-in and sign-out through Supabase Auth (GoTrue).

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{SupabaseClient, SupabaseError};

/// The signed-in user as reported by Supabase Auth.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens returned by a successful sign-in.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct AuthSession {
    access_token: SecretString,
    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Bearer token for authenticated table writes.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Raw `/token` response body.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in));

        AuthSession {
            access_token: SecretString::from(self.access_token),
            expires_at,
            user: self.user,
        }
    }
}

impl SupabaseClient {
    /// Exchange an email and password for an access token.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::InvalidCredentials` when Supabase rejects the
    /// credentials (HTTP 400), or another error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let url = self.auth_url("token", &[("grant_type", "password")])?;
        let response = self
            .request(Method::POST, url, None)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = match Self::check(response).await {
            Ok(response) => response,
            Err(SupabaseError::Api { status: 400, .. }) => {
                return Err(SupabaseError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        Ok(token.into_session(Utc::now()))
    }

    /// Revoke the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Supabase rejects the token.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.auth_url("logout", &[])?;
        let response = self
            .request(Method::POST, url, Some(access_token))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::test_support::client_for;
    use super::*;

    #[tokio::test]
    async fn test_sign_in_returns_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({ "email": "owner@brand.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "expires_at": 1_900_000_000,
                "refresh_token": "refresh",
                "user": { "id": "8d0f6c1e", "email": "owner@brand.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server)
            .sign_in_with_password("owner@brand.com", "pw")
            .await
            .unwrap();

        assert_eq!(session.access_token(), "jwt-token");
        assert_eq!(session.user.email.as_deref(), Some("owner@brand.com"));
        assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
        assert!(!format!("{session:?}").contains("jwt-token"));
    }

    #[tokio::test]
    async fn test_sign_in_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 400,
                "error_code": "invalid_credentials",
                "msg": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .sign_in_with_password("owner@brand.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, SupabaseError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_sign_out_sends_user_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer jwt-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).sign_out("jwt-token").await.unwrap();
    }

    #[test]
    fn test_expiry_falls_back_to_expires_in() {
        let token = TokenResponse {
            access_token: "t".to_string(),
            expires_in: 3600,
            expires_at: None,
            user: AuthUser {
                id: "u".to_string(),
                email: None,
            },
        };
        let now = Utc::now();
        let session = token.into_session(now);
        assert_eq!(session.expires_at, now + Duration::seconds(3600));
    }
}
