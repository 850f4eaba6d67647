use super::failover::FailoverError;
use super::provider::ProviderId;
use crate::error::AppError;
use crate::infrastructure::repositories::FailureKind;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("no API key configured for {0}")]
    Unconfigured(ProviderId),

    #[error("{provider} rejected every API key ({attempts} tried) at segment {chunk_index}")]
    Authentication {
        provider: ProviderId,
        chunk_index: usize,
        attempts: usize,
    },

    #[error("{provider} quota exhausted on every API key ({attempts} tried) at segment {chunk_index}")]
    QuotaExhausted {
        provider: ProviderId,
        chunk_index: usize,
        attempts: usize,
    },

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("{provider} refused the content of segment {chunk_index}")]
    ContentPolicy {
        provider: ProviderId,
        chunk_index: usize,
    },

    #[error("{provider} is unavailable ({attempts} attempt(s)) at segment {chunk_index}")]
    ProviderUnavailable {
        provider: ProviderId,
        chunk_index: usize,
        attempts: usize,
    },

    #[error("{provider} returned no audio: {reason}")]
    EmptyResult { provider: ProviderId, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TtsServiceError {
    /// Stable machine-readable code
    pub fn category(&self) -> &'static str {
        match self {
            TtsServiceError::Unconfigured(_) => "unconfigured",
            TtsServiceError::Authentication { .. } => "authentication",
            TtsServiceError::QuotaExhausted { .. } => "quota_exhausted",
            TtsServiceError::Invalid(_) => "validation",
            TtsServiceError::ContentPolicy { .. } => "content_policy",
            TtsServiceError::ProviderUnavailable { .. } => "provider_unavailable",
            TtsServiceError::EmptyResult { .. } => "empty_result",
            TtsServiceError::Other(_) => "internal",
        }
    }
}

impl From<FailoverError> for TtsServiceError {
    fn from(err: FailoverError) -> Self {
        let attempts = err.attempts();
        let (chunk_index, first) = match err {
            FailoverError::Unconfigured(provider) => return TtsServiceError::Unconfigured(provider),
            FailoverError::Exhausted {
                chunk_index, first, ..
            }
            | FailoverError::Aborted {
                chunk_index, first, ..
            } => (chunk_index, first),
        };
        let provider = first.provider;

        match first.kind {
            FailureKind::Authentication => TtsServiceError::Authentication {
                provider,
                chunk_index,
                attempts,
            },
            FailureKind::RateLimited => TtsServiceError::QuotaExhausted {
                provider,
                chunk_index,
                attempts,
            },
            FailureKind::Transient => TtsServiceError::ProviderUnavailable {
                provider,
                chunk_index,
                attempts,
            },
            FailureKind::EmptyResult => TtsServiceError::EmptyResult {
                provider,
                reason: format!("segment {} came back empty", chunk_index),
            },
            FailureKind::Validation => TtsServiceError::Invalid(format!(
                "{} rejected segment {} (check voice and model)",
                provider, chunk_index
            )),
            FailureKind::ContentPolicy => TtsServiceError::ContentPolicy {
                provider,
                chunk_index,
            },
        }
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        let message = err.to_string();
        match err {
            TtsServiceError::Unconfigured(_) => AppError::PreconditionFailed(message),
            TtsServiceError::Authentication { .. } => AppError::UpstreamAuth(message),
            TtsServiceError::QuotaExhausted { .. } => AppError::RateLimitExceeded(message),
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::ContentPolicy { .. } => AppError::UnprocessableContent(message),
            TtsServiceError::ProviderUnavailable { .. } => AppError::ExternalService(message),
            TtsServiceError::EmptyResult { .. } => AppError::BadGateway(message),
            TtsServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
