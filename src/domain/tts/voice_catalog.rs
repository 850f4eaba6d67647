use super::language::LanguageCode;
use super::provider::ProviderId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
}

/// Which languages a catalog voice is offered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceLanguage {
    Only(LanguageCode),
    /// Multilingual voice, offered for every language
    Multi,
}

impl VoiceLanguage {
    pub fn matches(&self, language: LanguageCode) -> bool {
        match self {
            VoiceLanguage::Only(code) => *code == language,
            VoiceLanguage::Multi => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceLanguage::Only(code) => code.as_str(),
            VoiceLanguage::Multi => "multi",
        }
    }
}

impl Serialize for VoiceLanguage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceOption {
    pub id: &'static str,
    pub name: &'static str,
    pub gender: VoiceGender,
    pub traits: &'static str,
    pub provider: ProviderId,
    pub language: VoiceLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<&'static str>,
}

const fn gemini(
    id: &'static str,
    name: &'static str,
    gender: VoiceGender,
    traits: &'static str,
    language: LanguageCode,
) -> VoiceOption {
    VoiceOption {
        id,
        name,
        gender,
        traits,
        provider: ProviderId::Gemini,
        language: VoiceLanguage::Only(language),
        preview_url: None,
    }
}

const fn elevenlabs(
    id: &'static str,
    name: &'static str,
    gender: VoiceGender,
    traits: &'static str,
    language: VoiceLanguage,
    preview_url: Option<&'static str>,
) -> VoiceOption {
    VoiceOption {
        id,
        name,
        gender,
        traits,
        provider: ProviderId::ElevenLabs,
        language,
        preview_url,
    }
}

use LanguageCode::{EnglishGb, EnglishUs, Japanese, Korean, Vietnamese};
use VoiceGender::{Female, Male};
use VoiceLanguage::{Multi, Only};

static VOICES: &[VoiceOption] = &[
    gemini("Aoede", "Ngọc Huyền (Aoede)", Female, "Confident, News", Vietnamese),
    gemini("Charon", "Minh Quân (Charon)", Male, "Warm, Documentary", Vietnamese),
    gemini("Fenrir", "Thanh Tùng (Fenrir)", Male, "Lively, Review", Vietnamese),
    gemini("Kore", "Diệu Linh (Kore)", Female, "Relaxed, Storytelling", Vietnamese),
    gemini("Puck", "Hoàng Bách (Puck)", Male, "Natural, Reportage", Vietnamese),
    gemini("Zephyr", "Mai Anh (Zephyr)", Female, "Sweet, Audiobook", Vietnamese),
    gemini("Aoede_US", "Aoede (US)", Female, "Confident, Professional", EnglishUs),
    gemini("Charon_US", "Charon (US)", Male, "Deep, Authoritative", EnglishUs),
    gemini("Fenrir_US", "Fenrir (US)", Male, "Energetic, Strong", EnglishUs),
    gemini("Kore_US", "Kore (US)", Female, "Calm, Soothing", EnglishUs),
    gemini("Puck_US", "Puck (US)", Male, "Natural, Spoken", EnglishUs),
    gemini("Zephyr_US", "Zephyr (US)", Female, "High pitched, Sweet", EnglishUs),
    gemini("Puck_GB", "Arthur (Puck)", Male, "British, Formal", EnglishGb),
    gemini("Kore_GB", "Emma (Kore)", Female, "British, Gentle", EnglishGb),
    gemini("Fenrir_GB", "Harry (Fenrir)", Male, "British, Energetic", EnglishGb),
    gemini("Kore_JP", "Sakura (Kore)", Female, "Soft, Anime style", Japanese),
    gemini("Charon_JP", "Kenji (Charon)", Male, "Deep, Samurai", Japanese),
    gemini("Zephyr_JP", "Hina (Zephyr)", Female, "High pitch, Cute", Japanese),
    gemini("Aoede_KR", "Ji-woo (Aoede)", Female, "Professional, News", Korean),
    gemini("Puck_KR", "Min-ho (Puck)", Male, "Casual, Drama", Korean),
    elevenlabs(
        "pNInz6obpgDQGcFmaJgB",
        "Adam",
        Male,
        "American, Deep, Narration",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/adam.mp3"),
    ),
    elevenlabs(
        "ErXwobaYiN019PkySvjV",
        "Antoni",
        Male,
        "American, Balanced, Podcast",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/antoni.mp3"),
    ),
    elevenlabs(
        "IKne3meq5aSn9XLyUdCD",
        "Charlie",
        Male,
        "Australian, Natural, Casual",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/charlie.mp3"),
    ),
    elevenlabs(
        "TxGEqnHWrfWFTfGW9XjX",
        "Josh",
        Male,
        "American, Deep, Storytelling",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/josh.mp3"),
    ),
    elevenlabs("VR6AewLTigWg4xSOukaG", "Arnold", Male, "American, Crisp", Multi, None),
    elevenlabs(
        "21m00Tcm4TlvDq8ikWAM",
        "Rachel",
        Female,
        "American, Voice-over, Calm",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/rachel.mp3"),
    ),
    elevenlabs(
        "AZnzlk1XvdvUeBnXmlld",
        "Domi",
        Female,
        "American, Strong, News",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/domi.mp3"),
    ),
    elevenlabs(
        "EXAVITQu4vr4xnSDxMaL",
        "Bella",
        Female,
        "American, Gentle, Storytelling",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/bella.mp3"),
    ),
    elevenlabs("FGY2WhTYpPnrIDTdsKH5", "Laura", Female, "American, Upbeat, Social Media", Multi, None),
    elevenlabs("jsCqWAovK2LkecY7zXl4", "Freya", Female, "American, Deep, Narration", Multi, None),
    elevenlabs(
        "XrExE9yKIg1WjnnlVkGX",
        "Matilda",
        Female,
        "American, Warm, Audiobook",
        Multi,
        Some("https://storage.googleapis.com/eleven-public-cdn/audio/marketing/matilda.mp3"),
    ),
    elevenlabs("JBFqnCBsd6RMkjVDRZzb", "George", Male, "British, Warm, Narration", Multi, None),
    elevenlabs("bVMeCyTHy58xNoL34h3p", "Jeremy", Male, "British, Deep, Gentleman", Multi, None),
    elevenlabs("ODq5zmih8GrVes37Dizj", "Patrick", Male, "British, Shouty, Hype", Multi, None),
    elevenlabs("7Y44f81P8s14FvG8l8Xl", "Takumi", Male, "Japanese, Composed", Only(Japanese), None),
    elevenlabs("bIHjv166Xa93aQ9gX0lD", "Kyoko", Female, "Japanese, Anime, Clear", Only(Japanese), None),
    elevenlabs("YkO5Hq58XX50Q6S2w1lE", "Jin-Soo", Male, "Korean, News, Serious", Only(Korean), None),
    elevenlabs("65r76831Q871w21285Xl", "So-Young", Female, "Korean, Gentle, Storytelling", Only(Korean), None),
];

/// Voices offered for a provider, optionally narrowed to one language
pub fn voices(provider: ProviderId, language: Option<LanguageCode>) -> Vec<VoiceOption> {
    VOICES
        .iter()
        .filter(|voice| voice.provider == provider)
        .filter(|voice| language.map_or(true, |code| voice.language.matches(code)))
        .copied()
        .collect()
}

/// Default voice when the caller does not pick one
pub fn default_voice(provider: ProviderId, language: LanguageCode) -> Option<&'static str> {
    VOICES
        .iter()
        .find(|voice| voice.provider == provider && voice.language.matches(language))
        .map(|voice| voice.id)
}

/// Name the provider API expects for a catalog id.
///
/// Gemini catalog ids carry a locale suffix (`Puck_US`) to keep them unique
/// per language; the API only knows the prebuilt name before the underscore.
/// ElevenLabs ids are opaque and pass through unchanged.
pub fn provider_voice_name(provider: ProviderId, voice_id: &str) -> &str {
    match provider {
        ProviderId::Gemini => voice_id.split('_').next().unwrap_or(voice_id),
        ProviderId::ElevenLabs => voice_id,
    }
}
