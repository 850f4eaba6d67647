use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_supported_languages(ctx: &TestContext) {
    let response = ctx.client.get("/api/languages").await.unwrap();

    response.assert_status(StatusCode::OK);

    let languages = response.body.as_ref().unwrap().as_array().unwrap().clone();
    let codes: Vec<&str> = languages
        .iter()
        .map(|language| language["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"vi-VN"));
    assert!(codes.contains(&"ko-KR"));
    assert!(languages.iter().all(|language| language["name"].is_string()));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_voices_by_provider(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/api/voices?provider=elevenlabs")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let voices = response.body.as_ref().unwrap().as_array().unwrap().clone();
    assert!(!voices.is_empty());
    assert!(voices.iter().all(|voice| voice["provider"] == "elevenlabs"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_voices_of_every_provider_by_default(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices").await.unwrap();

    response.assert_status(StatusCode::OK);

    let voices = response.body.as_ref().unwrap().as_array().unwrap().clone();
    assert!(voices.iter().any(|voice| voice["provider"] == "gemini"));
    assert!(voices.iter().any(|voice| voice["provider"] == "elevenlabs"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_an_unknown_provider_filter(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices?provider=polly").await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_category("validation");
}
