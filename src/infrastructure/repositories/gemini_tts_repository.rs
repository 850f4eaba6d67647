use super::tts_repository::{
    FailureKind, ImagePromptRepository, ProviderError, SynthesisRequest, TtsRepository,
};
use crate::domain::tts::voice_catalog::provider_voice_name;
use crate::domain::tts::{AudioFormat, ProviderId};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Gemini speech is headerless signed 16-bit PCM, 24 kHz mono
pub const GEMINI_AUDIO_FORMAT: AudioFormat = AudioFormat::Pcm16 {
    sample_rate: 24_000,
    channels: 1,
};

const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub tts_model: String,
    pub text_model: String,
    pub max_chunk_chars: usize,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            max_chunk_chars: 3000,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status: Option<String>,
    message: Option<String>,
}

/// Gemini `generateContent` implementation of the TTS repository
pub struct GeminiTtsRepository {
    http_client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiTtsRepository {
    pub fn new(http_client: reqwest::Client, settings: GeminiSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }

    /// POST a generateContent call and return the parsed 2xx body
    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
        credential: &str,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let response = self
            .http_client
            .post(self.endpoint(model))
            .header("x-goog-api-key", credential)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(ProviderId::Gemini, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(ProviderId::Gemini, e))?;

        if !status.is_success() {
            let kind = classify(status.as_u16(), &text);
            return Err(
                ProviderError::new(ProviderId::Gemini, kind, error_detail(&text))
                    .with_status(status.as_u16()),
            );
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::new(
                ProviderId::Gemini,
                FailureKind::EmptyResult,
                format!("unreadable response: {}", e),
            )
            .with_status(status.as_u16())
        })
    }
}

#[async_trait]
impl TtsRepository for GeminiTtsRepository {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn audio_format(&self) -> AudioFormat {
        GEMINI_AUDIO_FORMAT
    }

    fn max_chunk_chars(&self) -> usize {
        self.settings.max_chunk_chars
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest<'_>,
        credential: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        let start_time = Instant::now();
        let model = request.model.unwrap_or(&self.settings.tts_model);
        let voice_name = provider_voice_name(ProviderId::Gemini, request.voice_id);

        tracing::debug!(
            provider = "gemini",
            model = %model,
            voice = %voice_name,
            language = %request.language,
            text_length = request.text.chars().count(),
            "Calling Gemini TTS"
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: build_speech_prompt(request),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice_name.to_string(),
                        },
                    },
                },
            }),
        };

        let response = self.generate(model, &body, credential).await?;
        let audio = extract_audio(response)?;

        tracing::info!(
            provider = "gemini",
            model = %model,
            voice = %voice_name,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = request.text.chars().count(),
            audio_size_bytes = audio.len(),
            "Gemini chunk synthesized"
        );

        Ok(audio)
    }
}

#[async_trait]
impl ImagePromptRepository for GeminiTtsRepository {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn generate_image_prompt(
        &self,
        text: &str,
        credential: &str,
    ) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: format!(
                        "Create a highly detailed, artistic and photorealistic image generation \
                         prompt in English for the following text. Describe the scene, mood, \
                         lighting and subjects so it works as a video thumbnail or cinematic \
                         background. Only return the prompt text.\n\n\"{}\"",
                        text
                    ),
                }],
            }],
            generation_config: None,
        };

        let response = self
            .generate(&self.settings.text_model, &body, credential)
            .await?;

        let prompt: String = response
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.map(|c| c.parts).unwrap_or_default())
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string();

        if prompt.is_empty() {
            return Err(ProviderError::new(
                ProviderId::Gemini,
                FailureKind::EmptyResult,
                "no prompt text returned",
            ));
        }

        Ok(prompt)
    }
}

/// Speech prompt: directives and context first, then the only text to voice
fn build_speech_prompt(request: &SynthesisRequest<'_>) -> String {
    let language = request.language.display_name();
    let mut prompt = String::new();

    if !request.context.previous_excerpt.is_empty() {
        prompt.push_str(&format!(
            "[Preceding text for continuity, DO NOT read aloud: \"{}\"]\n",
            request.context.previous_excerpt
        ));
    }
    if !request.context.next_excerpt.is_empty() {
        prompt.push_str(&format!(
            "[Following text for continuity, DO NOT read aloud: \"{}\"]\n",
            request.context.next_excerpt
        ));
    }

    prompt.push_str(&format!(
        "Say in {} with {}: {}",
        language,
        request.persona.directives(),
        request.text
    ));
    prompt
}

fn extract_audio(response: GenerateContentResponse) -> Result<Vec<u8>, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(ProviderError::new(
            ProviderId::Gemini,
            FailureKind::ContentPolicy,
            format!("prompt blocked: {}", reason),
        ));
    }

    let mut finish_reason = None;
    for candidate in response.candidates {
        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKING_FINISH_REASONS.contains(&reason) {
                return Err(ProviderError::new(
                    ProviderId::Gemini,
                    FailureKind::ContentPolicy,
                    format!("generation stopped: {}", reason),
                ));
            }
        }
        finish_reason = candidate.finish_reason.or(finish_reason);

        let inline = candidate
            .content
            .into_iter()
            .flat_map(|content| content.parts)
            .find_map(|part| part.inline_data);

        if let Some(inline) = inline {
            let audio = STANDARD.decode(inline.data.trim()).map_err(|e| {
                ProviderError::new(
                    ProviderId::Gemini,
                    FailureKind::EmptyResult,
                    format!("invalid base64 audio: {}", e),
                )
            })?;
            if !audio.is_empty() {
                return Ok(audio);
            }
        }
    }

    Err(ProviderError::new(
        ProviderId::Gemini,
        FailureKind::EmptyResult,
        format!(
            "no audio in response (finish reason: {})",
            finish_reason.as_deref().unwrap_or("none")
        ),
    ))
}

/// Map a non-2xx Gemini response to a failure kind
pub(crate) fn classify(status: u16, body: &str) -> FailureKind {
    let api_status = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.status)
        .unwrap_or_default();
    let lowered = body.to_lowercase();

    if status == 429 || api_status == "RESOURCE_EXHAUSTED" || lowered.contains("quota") {
        FailureKind::RateLimited
    } else if status == 401
        || status == 403
        || api_status == "UNAUTHENTICATED"
        || api_status == "PERMISSION_DENIED"
        || lowered.contains("api key not valid")
        || lowered.contains("api_key_invalid")
    {
        FailureKind::Authentication
    } else if status >= 500 || status == 408 {
        FailureKind::Transient
    } else if lowered.contains("safety") || lowered.contains("blocked") {
        FailureKind::ContentPolicy
    } else {
        FailureKind::Validation
    }
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.to_string())
}
