use super::language::LanguageCode;
use super::provider::ProviderId;
use serde::{Deserialize, Serialize};

/// Tone and style values that mean "nothing in particular"
const NEUTRAL_PLACEHOLDERS: [&str; 3] = ["standard", "default", "tiêu chuẩn"];

const DEFAULT_DIRECTIVES: &str = "a neutral, professional narrator voice with steady pacing";

/// Request for POST /api/tts/synthesize and /api/tts/synthesize/stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub provider: ProviderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub image_prompt: bool,
}

/// Speaking directives shared by every chunk of a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Persona {
    pub tone: Option<String>,
    pub style: Option<String>,
    pub instructions: Option<String>,
}

impl Persona {
    pub fn new(
        tone: Option<&str>,
        style: Option<&str>,
        instructions: Option<&str>,
    ) -> Self {
        Self {
            tone: meaningful(tone),
            style: meaningful(style),
            instructions: instructions
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        }
    }

    pub fn from_request(request: &TtsRequest) -> Self {
        Self::new(
            request.tone.as_deref(),
            request.style.as_deref(),
            request.instructions.as_deref(),
        )
    }

    pub fn has_style(&self) -> bool {
        self.style.is_some()
    }

    /// Comma separated directives for generative prompts
    pub fn directives(&self) -> String {
        let mut parts = Vec::new();
        if let Some(tone) = &self.tone {
            parts.push(format!("{} tone", tone));
        }
        if let Some(style) = &self.style {
            parts.push(format!("{} style", style));
        }
        if let Some(instructions) = &self.instructions {
            parts.push(instructions.clone());
        }

        if parts.is_empty() {
            DEFAULT_DIRECTIVES.to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn meaningful(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || NEUTRAL_PLACEHOLDERS.contains(&value.to_lowercase().as_str()) {
        return None;
    }
    Some(value.to_string())
}

/// Body for PUT /api/credentials/:provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCredentialsRequest {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceQuery {
    pub provider: Option<ProviderId>,
    pub language: Option<LanguageCode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageResponse {
    pub code: LanguageCode,
    pub name: &'static str,
}
