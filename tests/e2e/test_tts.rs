use crate::e2e::helpers;

use helpers::{
    gemini_audio_response, gemini_quota_response, parse_sse, TestContext, ELEVENLABS_KEY,
    GEMINI_KEY_A, GEMINI_KEY_B,
};
use httpmock::Method::POST;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

const GEMINI_SPEECH_PATH: &str = "/v1beta/models/gemini-2.5-flash-preview-tts:generateContent";
const WAV_HEADER_LEN: usize = 44;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_a_short_text_with_gemini(ctx: &TestContext) {
    let pcm = vec![7u8; 480];
    let mock = ctx
        .gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path(GEMINI_SPEECH_PATH)
                .header("x-goog-api-key", GEMINI_KEY_A)
                .body_contains("Good morning, listeners.");
            then.status(200).json_body(gemini_audio_response(&pcm));
        })
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({
                "text": "Good morning, listeners.",
                "provider": "gemini",
                "language": "en-US"
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/wav")
        .assert_header("x-segment-count", "1")
        .assert_header("x-provider", "gemini")
        .assert_header("x-language", "en-US");

    assert_eq!(response.body_bytes.len(), pcm.len() + WAV_HEADER_LEN);
    assert_eq!(&response.body_bytes[..4], b"RIFF");
    assert!(response.header("x-image-prompt").is_none());
    mock.assert_async().await;
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_over_to_the_next_key_on_quota_errors(ctx: &TestContext) {
    let exhausted = ctx
        .gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path(GEMINI_SPEECH_PATH)
                .header("x-goog-api-key", GEMINI_KEY_A);
            then.status(429).json_body(gemini_quota_response());
        })
        .await;
    let healthy = ctx
        .gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path(GEMINI_SPEECH_PATH)
                .header("x-goog-api-key", GEMINI_KEY_B);
            then.status(200).json_body(gemini_audio_response(&[1, 0, 2, 0]));
        })
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({ "text": "A short bulletin.", "provider": "gemini", "language": "en-US" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(exhausted.hits_async().await, 1);
    assert_eq!(healthy.hits_async().await, 1);

    // Success on the second key moves the cursor past it, wrapping to the first
    let pools = ctx.client.get("/api/credentials").await.unwrap();
    assert_eq!(pools.body.as_ref().unwrap()[0]["cursor"], 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_quota_exhaustion_when_every_key_is_limited(ctx: &TestContext) {
    let mock = ctx
        .gemini
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_SPEECH_PATH);
            then.status(429).json_body(gemini_quota_response());
        })
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({ "text": "A short bulletin.", "provider": "gemini", "language": "en-US" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::TOO_MANY_REQUESTS)
        .assert_error_category("quota_exhausted");
    assert_eq!(mock.hits_async().await, 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_an_authentication_failure(ctx: &TestContext) {
    let mock = ctx
        .elevenlabs
        .mock_async(|when, then| {
            when.method(POST)
                .path_contains("/v1/text-to-speech/")
                .header("xi-api-key", ELEVENLABS_KEY);
            then.status(401).json_body(json!({
                "detail": { "status": "invalid_api_key", "message": "Invalid API key" }
            }));
        })
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({ "text": "Hello there.", "provider": "elevenlabs", "language": "en-US" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_category("authentication");

    // The raw provider body is never forwarded
    let raw = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert!(!raw.contains("Invalid API key"));
    assert!(!raw.contains(ELEVENLABS_KEY));
    mock.assert_async().await;
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_mp3_from_elevenlabs(ctx: &TestContext) {
    let mp3 = b"ID3\x04fake-mp3-frames".to_vec();
    let mock = ctx
        .elevenlabs
        .mock_async(|when, then| {
            when.method(POST)
                .path_contains("/v1/text-to-speech/")
                .query_param("output_format", "mp3_44100_128");
            then.status(200)
                .header("content-type", "audio/mpeg")
                .body(mp3.clone());
        })
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({ "text": "Hello there.", "provider": "elevenlabs", "language": "en-US" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header("x-provider", "elevenlabs");
    assert_eq!(response.body_bytes, mp3);
    mock.assert_async().await;
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_refuse_a_provider_without_keys(ctx: &TestContext) {
    ctx.client
        .put("/api/credentials/elevenlabs", &json!({ "keys": [] }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({ "text": "Hello there.", "provider": "elevenlabs" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PRECONDITION_FAILED)
        .assert_error_category("unconfigured");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_blank_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post_with_headers(
            "/api/tts/synthesize",
            &json!({ "text": "   \n\n ", "provider": "gemini" }),
            &[("x-request-id", "narration-test-1")],
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_category("validation")
        .assert_header("x-request-id", "narration-test-1");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_json(ctx: &TestContext) {
    let response = ctx
        .client
        .post_raw("/api/tts/synthesize", "{\"text\": ")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_category("validation");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_segments_before_completion(ctx: &TestContext) {
    ctx.gemini
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_SPEECH_PATH);
            then.status(200).json_body(gemini_audio_response(&[0u8; 100]));
        })
        .await;

    let text = "The harbor was quiet before sunrise and the boats rested on the water.\n\n\
                By noon the market had filled with voices, carts and the smell of fresh bread.";

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize/stream",
            &json!({ "text": text, "provider": "gemini", "language": "en-US" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "text/event-stream");

    let events = parse_sse(&response.body_bytes).unwrap();
    let (last_name, completed) = events.last().expect("no events streamed");
    assert_eq!(last_name, "completed");

    let segments: Vec<_> = events
        .iter()
        .filter(|(name, _)| name == "segment")
        .map(|(_, data)| data)
        .collect();
    assert!(segments.len() >= 2, "expected several segments: {:?}", events);
    assert_eq!(segments.len() + 1, events.len());

    for (position, segment) in segments.iter().enumerate() {
        assert_eq!(segment["id"], position);
        assert_eq!(segment["total"], segments.len());
    }
    assert_eq!(completed["segment_count"], segments.len());
    assert_eq!(completed["format"], "audio/wav");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_an_error_event_when_a_job_fails(ctx: &TestContext) {
    ctx.gemini
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_SPEECH_PATH);
            then.status(400).json_body(json!({
                "error": { "code": 400, "message": "Invalid voice", "status": "INVALID_ARGUMENT" }
            }));
        })
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/synthesize/stream",
            &json!({ "text": "Hello there.", "provider": "gemini", "language": "en-US" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let events = parse_sse(&response.body_bytes).unwrap();
    assert_eq!(events.len(), 1, "{:?}", events);
    let (name, data) = &events[0];
    assert_eq!(name, "error");
    assert_eq!(data["category"], "validation");
}
