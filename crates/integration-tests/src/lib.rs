//! Integration tests for the Social Culture site.
//!
//! Each [`TestContext`] boots the full application router on an ephemeral
//! port, backed by a `wiremock` stand-in for Supabase and an in-memory mail
//! transport, and drives it with a cookie-keeping HTTP client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p social-culture-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use lettre::transport::stub::AsyncStubTransport;
use reqwest::{Client, Response, redirect::Policy};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use social_culture_site::config::{EmailConfig, SiteConfig, SupabaseConfig};
use social_culture_site::services::EmailService;
use social_culture_site::state::AppState;
use social_culture_site::supabase::SupabaseClient;

/// Address that receives contact notifications.
pub const OWNER: &str = "owner@socialculture.agency";

/// Access token handed out by the mocked password grant.
pub const EDITOR_TOKEN: &str = "editor-jwt";

/// A running site plus the doubles behind it.
pub struct TestContext {
    /// HTTP client with a cookie store; redirects are not followed.
    pub client: Client,
    /// Root URL of the running site, without a trailing slash.
    pub base_url: String,
    /// Stand-in for the Supabase project.
    pub supabase: MockServer,
    /// Every message the site tried to send.
    pub mail: AsyncStubTransport,
}

impl TestContext {
    /// Boot a site whose mail transport accepts everything.
    pub async fn new() -> Self {
        Self::with_mail(AsyncStubTransport::new_ok()).await
    }

    /// Boot a site on top of the given mail transport.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the client cannot be built.
    pub async fn with_mail(mail: AsyncStubTransport) -> Self {
        let supabase = MockServer::start().await;
        let config = config_for(&supabase.uri());

        let email = EmailService::stub(OWNER, mail.clone()).expect("valid owner address");
        let state = AppState::with_services(
            config.clone(),
            SupabaseClient::new(&config.supabase),
            email,
        );
        let app = social_culture_site::app(state);

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
            supabase,
            mail,
        }
    }

    /// Absolute URL for a site path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a page and return its body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn page(&self, path: &str) -> String {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
            .text()
            .await
            .expect("body is text")
    }

    /// POST a urlencoded form.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }

    /// Serve the given rows for every read of the content tables.
    pub async fn mount_content(&self, services: Value, projects: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(services))
            .mount(&self.supabase)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(projects))
            .mount(&self.supabase)
            .await;
    }

    /// Accept any password and sign the client in as the editor.
    ///
    /// # Panics
    ///
    /// Panics if the login does not redirect home.
    pub async fn sign_in(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": EDITOR_TOKEN,
                "token_type": "bearer",
                "expires_in": 3600,
                "user": { "id": "5b1f0c2e", "email": OWNER }
            })))
            .mount(&self.supabase)
            .await;

        let response = self
            .post_form("/auth/login", &[("email", OWNER), ("password", "secret")])
            .await;
        assert_eq!(location(&response), Some("/"));
    }
}

/// Target of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// One service row as Supabase returns it.
#[must_use]
pub fn service_row(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Paid campaigns across Meta and TikTok",
        "image_url": null,
        "featured": true
    })
}

/// One project row as Supabase returns it.
#[must_use]
pub fn project_row(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Relaunch of a coffee brand",
        "image_url": "",
        "details": {
            "challenge": "Low repeat orders",
            "strategy": ["Loyalty content", "Creator partnerships"],
            "results": ["+40% repeat orders", "+3x reach", "+18% basket size"],
            "category": "F&B",
            "duration": "3 months"
        }
    })
}

fn config_for(supabase_url: &str) -> SiteConfig {
    SiteConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost".to_string(),
        supabase: SupabaseConfig {
            url: supabase_url.to_string(),
            anon_key: SecretString::from("anon-integration-key"),
        },
        email: EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            username: OWNER.to_string(),
            password: SecretString::from("smtp-integration-password"),
        },
        whatsapp_number: "201011405879".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
