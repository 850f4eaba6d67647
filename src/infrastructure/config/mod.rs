use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::infrastructure::repositories::elevenlabs_tts_repository::{
    DEFAULT_MODEL as ELEVENLABS_DEFAULT_MODEL, ELEVENLABS_BASE_URL,
};
use crate::infrastructure::repositories::gemini_tts_repository::{
    DEFAULT_TEXT_MODEL, DEFAULT_TTS_MODEL, GEMINI_BASE_URL,
};
use crate::infrastructure::repositories::{ElevenLabsSettings, GeminiSettings};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    // Credentials
    pub gemini_api_keys: Vec<String>,
    pub gemini_fallback_key: Option<String>,
    pub elevenlabs_api_keys: Vec<String>,
    pub credential_store_path: Option<PathBuf>,
    // Providers
    pub gemini_base_url: String,
    pub gemini_tts_model: String,
    pub gemini_text_model: String,
    pub gemini_max_chunk_chars: usize,
    pub elevenlabs_base_url: String,
    pub elevenlabs_default_model: String,
    pub elevenlabs_max_chunk_chars: usize,
    // Jobs
    pub context_excerpt_chars: usize,
    pub max_input_chars: usize,
    pub request_timeout_secs: u64,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            gemini_api_keys: key_list("GEMINI_API_KEYS"),
            gemini_fallback_key: env::var("API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            elevenlabs_api_keys: key_list("ELEVENLABS_API_KEYS"),
            credential_store_path: env::var("CREDENTIAL_STORE_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| GEMINI_BASE_URL.to_string()),
            gemini_tts_model: env::var("GEMINI_TTS_MODEL")
                .unwrap_or_else(|_| DEFAULT_TTS_MODEL.to_string()),
            gemini_text_model: env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            gemini_max_chunk_chars: positive(parse_var("GEMINI_MAX_CHUNK_CHARS", 3000)?, "GEMINI_MAX_CHUNK_CHARS")?,
            elevenlabs_base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| ELEVENLABS_BASE_URL.to_string()),
            elevenlabs_default_model: env::var("ELEVENLABS_DEFAULT_MODEL")
                .unwrap_or_else(|_| ELEVENLABS_DEFAULT_MODEL.to_string()),
            elevenlabs_max_chunk_chars: positive(
                parse_var("ELEVENLABS_MAX_CHUNK_CHARS", 5000)?,
                "ELEVENLABS_MAX_CHUNK_CHARS",
            )?,
            context_excerpt_chars: parse_var("CONTEXT_EXCERPT_CHARS", 300)?,
            max_input_chars: positive(parse_var("MAX_INPUT_CHARS", 200_000)?, "MAX_INPUT_CHARS")?,
            request_timeout_secs: positive(parse_var("REQUEST_TIMEOUT_SECS", 120)?, "REQUEST_TIMEOUT_SECS")?,
            retry_backoff_ms: parse_var("RETRY_BACKOFF_MS", 500)?,
        };

        Ok(config)
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.gemini_base_url.clone(),
            tts_model: self.gemini_tts_model.clone(),
            text_model: self.gemini_text_model.clone(),
            max_chunk_chars: self.gemini_max_chunk_chars,
        }
    }

    pub fn elevenlabs_settings(&self) -> ElevenLabsSettings {
        ElevenLabsSettings {
            base_url: self.elevenlabs_base_url.clone(),
            default_model: self.elevenlabs_default_model.clone(),
            max_chunk_chars: self.elevenlabs_max_chunk_chars,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        _ => Ok(default),
    }
}

fn positive<T: PartialEq + Default>(value: T, name: &'static str) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::Zero(name));
    }
    Ok(value)
}

/// Comma or newline separated keys
fn key_list(name: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_default()
        .split([',', '\n'])
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
