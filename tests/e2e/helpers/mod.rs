use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use httpmock::MockServer;
use narration_backend::infrastructure::config::{Config, LogFormat};
use narration_backend::infrastructure::http::create_app;
use narration_backend::infrastructure::repositories::{
    CredentialRepository, InMemoryCredentialRepository,
};
use serde_json::{json, Value};
use std::sync::Arc;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;

use api_client::TestClient;

pub const GEMINI_KEY_A: &str = "gemini-test-key-a";
pub const GEMINI_KEY_B: &str = "gemini-test-key-b";
pub const ELEVENLABS_KEY: &str = "elevenlabs-test-key";

/// Chunk size small enough that a few sentences span several segments
pub const TEST_CHUNK_CHARS: usize = 80;

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub config: Config,
    pub gemini: MockServer,
    pub elevenlabs: MockServer,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let gemini = MockServer::start_async().await;
            let elevenlabs = MockServer::start_async().await;

            let config = test_config(&gemini, &elevenlabs);
            let credential_repo: Arc<dyn CredentialRepository> =
                Arc::new(InMemoryCredentialRepository::new());

            let app = create_app(&config, credential_repo)
                .await
                .expect("Failed to create app");

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                config,
                gemini,
                elevenlabs,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }
}

fn test_config(gemini: &MockServer, elevenlabs: &MockServer) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Assigned by the OS
        log_format: LogFormat::Pretty,
        gemini_api_keys: vec![GEMINI_KEY_A.to_string(), GEMINI_KEY_B.to_string()],
        gemini_fallback_key: None,
        elevenlabs_api_keys: vec![ELEVENLABS_KEY.to_string()],
        credential_store_path: None,
        gemini_base_url: gemini.base_url(),
        gemini_tts_model: "gemini-2.5-flash-preview-tts".to_string(),
        gemini_text_model: "gemini-2.5-flash".to_string(),
        gemini_max_chunk_chars: TEST_CHUNK_CHARS,
        elevenlabs_base_url: elevenlabs.base_url(),
        elevenlabs_default_model: "eleven_multilingual_v2".to_string(),
        elevenlabs_max_chunk_chars: TEST_CHUNK_CHARS,
        context_excerpt_chars: 40,
        max_input_chars: 10_000,
        request_timeout_secs: 5,
        retry_backoff_ms: 0,
    }
}

/// A successful Gemini speech response carrying `pcm` as inline audio
pub fn gemini_audio_response(pcm: &[u8]) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": {
                "mimeType": "audio/L16;codec=pcm;rate=24000",
                "data": STANDARD.encode(pcm)
            }}]},
            "finishReason": "STOP"
        }]
    })
}

pub fn gemini_quota_response() -> Value {
    json!({
        "error": {
            "code": 429,
            "message": "Resource has been exhausted (e.g. check quota).",
            "status": "RESOURCE_EXHAUSTED"
        }
    })
}

/// Parse an SSE body into (event name, JSON data) pairs, in order
pub fn parse_sse(body: &[u8]) -> Result<Vec<(String, Value)>> {
    let text = String::from_utf8(body.to_vec())?;
    let mut events = Vec::new();

    for block in text.split("\n\n") {
        let mut name = None;
        let mut data = String::new();
        for line in block.lines() {
            if let Some(value) = line.strip_prefix("event:") {
                name = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("data:") {
                data.push_str(value.trim_start());
            }
        }
        if let Some(name) = name {
            events.push((name, serde_json::from_str(&data)?));
        }
    }

    Ok(events)
}
