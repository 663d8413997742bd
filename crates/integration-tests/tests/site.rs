//! Integration tests for pages, health checks and response headers.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use social_culture_integration_tests::{TestContext, project_row};

#[tokio::test]
async fn test_health_and_request_id() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .get(ctx.url("/health"))
        .header("x-request-id", "edge-42")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "edge-42");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_readiness_follows_supabase() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&ctx.supabase)
        .await;

    let response = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_case_study_page() {
    let ctx = TestContext::new().await;
    ctx.mount_content(json!([]), json!([project_row(3, "Nile Roastery")]))
        .await;

    let page = ctx.page("/projects/3").await;

    assert!(page.contains("Nile Roastery"));
    assert!(page.contains("Creator partnerships"));
    assert!(page.contains("+18% basket size"));
    assert!(page.contains("3 months"));
}

#[tokio::test]
async fn test_unknown_case_study_is_not_found() {
    let ctx = TestContext::new().await;
    ctx.mount_content(json!([]), json!([])).await;

    for path in ["/projects/99", "/projects/not-a-number", "/no/such/page"] {
        let response = ctx.client.get(ctx.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        assert!(response.text().await.unwrap().contains("لم يتم العثور على هذه الدراسة."));
    }
}
