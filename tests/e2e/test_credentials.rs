use crate::e2e::helpers;

use helpers::{TestContext, ELEVENLABS_KEY, GEMINI_KEY_A};
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_pools_with_masked_keys(ctx: &TestContext) {
    let response = ctx.client.get("/api/credentials").await.unwrap();

    response.assert_status(StatusCode::OK);

    let raw = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert!(!raw.contains(GEMINI_KEY_A), "full key leaked: {}", raw);
    assert!(!raw.contains(ELEVENLABS_KEY), "full key leaked: {}", raw);

    let pools = response.body.as_ref().unwrap().as_array().unwrap().clone();
    assert_eq!(pools.len(), 2);

    let gemini = &pools[0];
    assert_eq!(gemini["provider"], "gemini");
    assert_eq!(gemini["configured"], true);
    assert_eq!(gemini["key_count"], 2);
    assert_eq!(gemini["cursor"], 0);
    assert_eq!(gemini["masked_keys"][0], "gem…ey-a");

    assert_eq!(pools[1]["provider"], "elevenlabs");
    assert_eq!(pools[1]["key_count"], 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_replace_keys_and_drop_blank_entries(ctx: &TestContext) {
    let response = ctx
        .client
        .put(
            "/api/credentials/elevenlabs",
            &json!({ "keys": ["  sk_first_key_0001 ", "", "sk_second_key_0002"] }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["provider"], "elevenlabs");
    assert_eq!(body["key_count"], 2);
    assert_eq!(body["masked_keys"], json!(["sk_…0001", "sk_…0002"]));

    let listed = ctx.client.get("/api/credentials").await.unwrap();
    assert_eq!(listed.body.as_ref().unwrap()[1]["key_count"], 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_an_unknown_provider(ctx: &TestContext) {
    let response = ctx
        .client
        .put("/api/credentials/polly", &json!({ "keys": ["k"] }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_category("not_found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_a_body_without_keys(ctx: &TestContext) {
    let response = ctx
        .client
        .put("/api/credentials/gemini", &json!({ "key": "single" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_category("validation");
}
