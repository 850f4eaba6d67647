use crate::domain::tts::{AudioFormat, LanguageCode, Persona, ProviderId, SynthesisContext};
use async_trait::async_trait;

/// Upper bound on provider error bodies kept for diagnostics
const MAX_DETAIL_CHARS: usize = 500;

/// Classification of a failed provider call.
///
/// The first four kinds are worth another attempt with the next credential;
/// the rest are properties of the request and would fail for any key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Authentication,
    RateLimited,
    Transient,
    EmptyResult,
    Validation,
    ContentPolicy,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::Authentication
                | FailureKind::RateLimited
                | FailureKind::Transient
                | FailureKind::EmptyResult
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Authentication => "authentication",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Transient => "transient",
            FailureKind::EmptyResult => "empty_result",
            FailureKind::Validation => "validation",
            FailureKind::ContentPolicy => "content_policy",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single failed call to a provider, already classified
#[derive(Debug, Clone, thiserror::Error)]
#[error("{provider} request failed ({kind})")]
pub struct ProviderError {
    pub provider: ProviderId,
    pub kind: FailureKind,
    pub status: Option<u16>,
    /// Provider message, truncated; never contains the credential
    pub detail: String,
}

impl ProviderError {
    pub fn new(provider: ProviderId, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            status: None,
            detail: truncate_detail(&detail.into()),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Network level failures (connect, timeout, body read) count as transient
    pub fn from_transport(provider: ProviderId, err: reqwest::Error) -> Self {
        let kind = if err.is_builder() {
            FailureKind::Validation
        } else {
            FailureKind::Transient
        };
        let mut error = Self::new(provider, kind, err.to_string());
        error.status = err.status().map(|status| status.as_u16());
        error
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

pub(crate) fn truncate_detail(detail: &str) -> String {
    if detail.chars().count() <= MAX_DETAIL_CHARS {
        return detail.to_string();
    }
    let mut truncated: String = detail.chars().take(MAX_DETAIL_CHARS).collect();
    truncated.push('…');
    truncated
}

/// Everything a provider needs to voice one chunk
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub language: LanguageCode,
    /// Catalog voice id, possibly carrying a locale suffix
    pub voice_id: &'a str,
    pub persona: &'a Persona,
    pub context: &'a SynthesisContext,
    /// Provider model override
    pub model: Option<&'a str>,
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (Gemini, ElevenLabs).
///
/// Implementations voice exactly one chunk per call and classify every
/// failure. Splitting, credential rotation and merging happen above this
/// layer.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Encoding of the payloads returned by `synthesize`
    fn audio_format(&self) -> AudioFormat;

    /// Largest chunk, in characters, this provider accepts
    fn max_chunk_chars(&self) -> usize;

    /// Synthesize one chunk using the given credential
    ///
    /// # Errors
    /// Returns a classified `ProviderError`; the caller decides whether to
    /// retry with another credential.
    async fn synthesize(
        &self,
        request: &SynthesisRequest<'_>,
        credential: &str,
    ) -> Result<Vec<u8>, ProviderError>;
}

/// Generates a short illustration prompt for a narrated text
#[async_trait]
pub trait ImagePromptRepository: Send + Sync {
    fn provider(&self) -> ProviderId;

    async fn generate_image_prompt(
        &self,
        text: &str,
        credential: &str,
    ) -> Result<String, ProviderError>;
}
