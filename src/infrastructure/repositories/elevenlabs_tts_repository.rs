use super::tts_repository::{FailureKind, ProviderError, SynthesisRequest, TtsRepository};
use crate::domain::tts::voice_catalog::provider_voice_name;
use crate::domain::tts::{AudioFormat, ProviderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Error statuses ElevenLabs uses for quota and capacity problems
const QUOTA_STATUSES: [&str; 3] = ["quota_exceeded", "too_many_concurrent_requests", "system_busy"];

#[derive(Debug, Clone)]
pub struct ElevenLabsSettings {
    pub base_url: String,
    pub default_model: String,
    pub max_chunk_chars: usize,
}

impl Default for ElevenLabsSettings {
    fn default() -> Self {
        Self {
            base_url: ELEVENLABS_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_chunk_chars: 5000,
        }
    }
}

#[derive(Debug, Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: ErrorDetail,
}

/// `detail` is an object for API errors and a plain string for some gateways
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured {
        status: Option<String>,
        message: Option<String>,
    },
    Plain(String),
}

/// ElevenLabs REST implementation of the TTS repository
pub struct ElevenLabsTtsRepository {
    http_client: reqwest::Client,
    settings: ElevenLabsSettings,
}

impl ElevenLabsTtsRepository {
    pub fn new(http_client: reqwest::Client, settings: ElevenLabsSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    fn endpoint(&self, voice: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.settings.base_url.trim_end_matches('/'),
            urlencoding::encode(voice),
            OUTPUT_FORMAT
        )
    }
}

#[async_trait]
impl TtsRepository for ElevenLabsTtsRepository {
    fn provider(&self) -> ProviderId {
        ProviderId::ElevenLabs
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
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
        let model = request.model.unwrap_or(&self.settings.default_model);
        let voice = provider_voice_name(ProviderId::ElevenLabs, request.voice_id);

        let body = TextToSpeechRequest {
            text: request.text,
            model_id: model,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
                style: if request.persona.has_style() { 0.5 } else { 0.0 },
            },
            previous_text: non_empty(&request.context.previous_excerpt),
            next_text: non_empty(&request.context.next_excerpt),
            // Only the v2.5 models accept an explicit language
            language_code: model
                .ends_with("_v2_5")
                .then(|| request.language.iso_639_1()),
        };

        tracing::debug!(
            provider = "elevenlabs",
            model = %model,
            voice = %voice,
            text_length = request.text.chars().count(),
            "Calling ElevenLabs TTS"
        );

        // The API has no prompt channel: style maps to a weight, tone and
        // instructions cannot be sent
        if request.persona.tone.is_some() || request.persona.instructions.is_some() {
            tracing::debug!(
                provider = "elevenlabs",
                tone = request.persona.tone.as_deref(),
                instructions = request.persona.instructions.as_deref(),
                "Persona tone and instructions are not supported by ElevenLabs, ignoring"
            );
        }

        let response = self
            .http_client
            .post(self.endpoint(voice))
            .header("xi-api-key", credential)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(ProviderId::ElevenLabs, e))?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let kind = classify(status.as_u16(), &text);
            return Err(
                ProviderError::new(ProviderId::ElevenLabs, kind, error_detail(&text))
                    .with_status(status.as_u16()),
            );
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_transport(ProviderId::ElevenLabs, e))?
            .to_vec();

        if audio.is_empty() {
            return Err(ProviderError::new(
                ProviderId::ElevenLabs,
                FailureKind::EmptyResult,
                "response body was empty",
            )
            .with_status(status.as_u16()));
        }

        tracing::info!(
            provider = "elevenlabs",
            model = %model,
            voice = %voice,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = request.text.chars().count(),
            audio_size_bytes = audio.len(),
            "ElevenLabs chunk synthesized"
        );

        Ok(audio)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Map a non-2xx ElevenLabs response to a failure kind
pub(crate) fn classify(status: u16, body: &str) -> FailureKind {
    let api_status = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            detail: ErrorDetail::Structured { status, .. },
        }) => status.unwrap_or_default(),
        _ => String::new(),
    };
    let quota = QUOTA_STATUSES.contains(&api_status.as_str());
    let lowered = body.to_lowercase();

    match status {
        429 => FailureKind::RateLimited,
        401 | 400 if quota => FailureKind::RateLimited,
        401 | 403 => FailureKind::Authentication,
        404 => FailureKind::Validation,
        400 | 422
            if lowered.contains("policy")
                || lowered.contains("moderation")
                || lowered.contains("safety") =>
        {
            FailureKind::ContentPolicy
        }
        408 | 500..=599 => FailureKind::Transient,
        _ => FailureKind::Validation,
    }
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            detail: ErrorDetail::Structured {
                message: Some(message),
                ..
            },
        }) => message,
        Ok(ErrorEnvelope {
            detail: ErrorDetail::Plain(message),
        }) => message,
        _ => body.to_string(),
    }
}
