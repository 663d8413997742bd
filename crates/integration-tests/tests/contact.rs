//! Integration tests for the contact form and the JSON contact endpoint.

#![allow(clippy::unwrap_used)]

use lettre::transport::stub::AsyncStubTransport;
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use social_culture_integration_tests::{OWNER, TestContext, location};
use social_culture_site::routes::contact::{FAILED, MISSING_FIELDS, SENT};

async fn expect_inserts(ctx: &TestContext, count: u64) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/contact_messages"))
        .respond_with(ResponseTemplate::new(201))
        .expect(count)
        .mount(&ctx.supabase)
        .await;
}

// =============================================================================
// Landing page form
// =============================================================================

#[tokio::test]
async fn test_form_with_empty_field_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.mount_content(json!([]), json!([])).await;
    expect_inserts(&ctx, 0).await;

    let response = ctx
        .post_form(
            "/contact",
            &[
                ("name", "Mona Hassan"),
                ("email", "mona@brand.com"),
                ("message", "   "),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/#contact"));

    let page = ctx.page("/").await;
    assert!(page.contains(MISSING_FIELDS));
    assert!(page.contains("Mona Hassan"), "typed values are kept");
    assert!(ctx.mail.messages().await.is_empty());
}

#[tokio::test]
async fn test_successful_form_clears_and_confirms() {
    let ctx = TestContext::new().await;
    ctx.mount_content(json!([]), json!([])).await;
    expect_inserts(&ctx, 1).await;

    let response = ctx
        .post_form(
            "/contact",
            &[
                ("name", "Mona Hassan"),
                ("email", "mona@brand.com"),
                ("message", "We need a launch campaign"),
            ],
        )
        .await;
    assert_eq!(location(&response), Some("/#contact"));

    let page = ctx.page("/").await;
    assert!(page.contains(SENT));
    assert!(!page.contains("Mona Hassan"));
    assert!(!page.contains("We need a launch campaign"));

    let messages = ctx.mail.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].0.to()[0].to_string(), OWNER);
    assert_eq!(messages[1].0.to()[0].to_string(), "mona@brand.com");

    // The notice shows once.
    assert!(!ctx.page("/").await.contains(SENT));
}

#[tokio::test]
async fn test_form_mail_failure_keeps_values() {
    let ctx = TestContext::with_mail(AsyncStubTransport::new_error()).await;
    ctx.mount_content(json!([]), json!([])).await;
    expect_inserts(&ctx, 1).await;

    ctx.post_form(
        "/contact",
        &[
            ("name", "Mona Hassan"),
            ("email", "mona@brand.com"),
            ("message", "We need a launch campaign"),
        ],
    )
    .await;

    let page = ctx.page("/").await;
    assert!(page.contains(FAILED));
    assert!(page.contains("We need a launch campaign"));
}

#[tokio::test]
async fn test_honeypot_submission_is_dropped() {
    let ctx = TestContext::new().await;
    expect_inserts(&ctx, 0).await;

    let response = ctx
        .post_form(
            "/contact",
            &[
                ("name", "Bot"),
                ("email", "bot@spam.example"),
                ("message", "Buy now"),
                ("company", "Spam Inc"),
            ],
        )
        .await;

    assert_eq!(location(&response), Some("/#contact"));
    assert!(ctx.mail.messages().await.is_empty());
}

// =============================================================================
// JSON endpoint
// =============================================================================

#[tokio::test]
async fn test_json_submission_succeeds() {
    let ctx = TestContext::new().await;
    expect_inserts(&ctx, 1).await;

    let response = ctx
        .client
        .post(ctx.url("/api/contact"))
        .json(&json!({
            "name": "Mona",
            "email": "mona@brand.com",
            "message": "Hello"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(ctx.mail.messages().await.len(), 2);
}

#[tokio::test]
async fn test_json_rejects_bad_address() {
    let ctx = TestContext::new().await;
    expect_inserts(&ctx, 0).await;

    let response = ctx
        .client
        .post(ctx.url("/api/contact"))
        .json(&json!({
            "name": "Mona",
            "email": "not-an-address",
            "message": "Hello"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_json_reports_datastore_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/contact_messages"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "relation \"contact_messages\" does not exist"
        })))
        .mount(&ctx.supabase)
        .await;

    let response = ctx
        .client
        .post(ctx.url("/api/contact"))
        .json(&json!({
            "name": "Mona",
            "email": "mona@brand.com",
            "message": "Hello"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "relation \"contact_messages\" does not exist"
    );
    assert!(ctx.mail.messages().await.is_empty());
}

#[tokio::test]
async fn test_submissions_are_rate_limited() {
    let ctx = TestContext::new().await;
    expect_inserts(&ctx, 0).await;

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let response = ctx
            .client
            .post(ctx.url("/api/contact"))
            .json(&json!({ "name": "", "email": "", "message": "" }))
            .send()
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::BAD_REQUEST));
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}
