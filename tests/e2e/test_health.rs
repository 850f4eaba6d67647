use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
    assert!(response.header("x-request-id").is_some());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_ready_when_a_provider_has_keys(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["providers"]["gemini"], "configured");
    assert_eq!(body["providers"]["elevenlabs"], "configured");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_not_ready_once_every_pool_is_emptied(ctx: &TestContext) {
    for provider in ["gemini", "elevenlabs"] {
        ctx.client
            .put(&format!("/api/credentials/{}", provider), &json!({ "keys": [] }))
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }

    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["providers"]["gemini"], "unconfigured");
}
