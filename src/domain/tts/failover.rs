use super::provider::ProviderId;
use crate::domain::credentials::{mask_key, CredentialPool};
use crate::infrastructure::repositories::{FailureKind, ProviderError};
use std::future::Future;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct FailoverPolicy {
    /// Pause before trying the next key after a transient failure
    pub transient_backoff: Duration,
}

impl Default for FailoverPolicy {
    fn default() -> Self {
        Self {
            transient_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FailoverError {
    #[error("no credentials configured for {0}")]
    Unconfigured(ProviderId),

    /// Every key in the pool failed with a retryable error
    #[error("all {attempts} credential(s) failed for chunk {chunk_index}")]
    Exhausted {
        chunk_index: usize,
        attempts: usize,
        first: ProviderError,
    },

    /// A non-retryable failure stopped the cycle early
    #[error("chunk {chunk_index} was rejected after {attempts} attempt(s)")]
    Aborted {
        chunk_index: usize,
        attempts: usize,
        first: ProviderError,
    },
}

impl FailoverError {
    /// First classified error of the cycle; it decides the job failure
    pub fn first_error(&self) -> Option<&ProviderError> {
        match self {
            FailoverError::Unconfigured(_) => None,
            FailoverError::Exhausted { first, .. } | FailoverError::Aborted { first, .. } => {
                Some(first)
            }
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            FailoverError::Unconfigured(_) => 0,
            FailoverError::Exhausted { attempts, .. } | FailoverError::Aborted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Run `op` with the pool's keys, starting at the cursor, until one succeeds.
///
/// The pool is advanced past the key that succeeded. Each key is tried at
/// most once per call, so the cycle is bounded by the pool size.
pub async fn run_with_failover<T, F, Fut>(
    pool: &mut CredentialPool,
    chunk_index: usize,
    policy: &FailoverPolicy,
    mut op: F,
) -> Result<T, FailoverError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let provider = pool.provider();
    let size = pool.size();
    if size == 0 {
        return Err(FailoverError::Unconfigured(provider));
    }

    let mut first: Option<ProviderError> = None;

    for attempt in 0..size {
        let Some((key_index, key)) = pool.key_at(attempt) else {
            break;
        };
        let key = key.to_string();
        let masked = mask_key(&key);
        let started = Instant::now();

        match op(key).await {
            Ok(value) => {
                tracing::debug!(
                    provider = %provider,
                    chunk_index,
                    attempt = attempt + 1,
                    key_index,
                    latency_ms = started.elapsed().as_millis(),
                    "Provider attempt succeeded"
                );
                pool.advance(key_index).await;
                return Ok(value);
            }
            Err(error) => {
                tracing::warn!(
                    provider = %provider,
                    chunk_index,
                    attempt = attempt + 1,
                    key_index,
                    key = %masked,
                    kind = %error.kind,
                    status = ?error.status,
                    detail = %error.detail,
                    latency_ms = started.elapsed().as_millis(),
                    "Provider attempt failed"
                );

                if !error.is_retryable() {
                    return Err(FailoverError::Aborted {
                        chunk_index,
                        attempts: attempt + 1,
                        first: first.unwrap_or(error),
                    });
                }

                let transient = error.kind == FailureKind::Transient;
                first.get_or_insert(error);

                let more_keys = attempt + 1 < size;
                if transient && more_keys && !policy.transient_backoff.is_zero() {
                    tokio::time::sleep(policy.transient_backoff).await;
                }
            }
        }
    }

    match first {
        Some(first) => Err(FailoverError::Exhausted {
            chunk_index,
            attempts: size,
            first,
        }),
        None => Err(FailoverError::Unconfigured(provider)),
    }
}
