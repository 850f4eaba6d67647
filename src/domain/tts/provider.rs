use serde::{Deserialize, Serialize};

/// TTS vendors the service can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    ElevenLabs,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::Gemini, ProviderId::ElevenLabs];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::ElevenLabs => "elevenlabs",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
