use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};

/// BCP 47 language tags supported by the narration service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "vi-VN")]
    Vietnamese,
    #[serde(rename = "en-US")]
    EnglishUs,
    #[serde(rename = "en-GB")]
    EnglishGb,
    #[serde(rename = "ja-JP")]
    Japanese,
    #[serde(rename = "ko-KR")]
    Korean,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 5] = [
        LanguageCode::Vietnamese,
        LanguageCode::EnglishUs,
        LanguageCode::EnglishGb,
        LanguageCode::Japanese,
        LanguageCode::Korean,
    ];

    /// Get the BCP 47 tag as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Vietnamese => "vi-VN",
            LanguageCode::EnglishUs => "en-US",
            LanguageCode::EnglishGb => "en-GB",
            LanguageCode::Japanese => "ja-JP",
            LanguageCode::Korean => "ko-KR",
        }
    }

    /// ISO 639-1 code, as expected by ElevenLabs `language_code`
    pub fn iso_639_1(&self) -> &'static str {
        match self {
            LanguageCode::Vietnamese => "vi",
            LanguageCode::EnglishUs | LanguageCode::EnglishGb => "en",
            LanguageCode::Japanese => "ja",
            LanguageCode::Korean => "ko",
        }
    }

    /// Name used inside generative prompts ("Say in <name> ...")
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageCode::Vietnamese => "Vietnamese",
            LanguageCode::EnglishUs => "American English",
            LanguageCode::EnglishGb => "British English",
            LanguageCode::Japanese => "Japanese",
            LanguageCode::Korean => "Korean",
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::Vietnamese => LanguageCode::Vietnamese,
            Language::English => LanguageCode::EnglishUs,
            Language::Japanese => LanguageCode::Japanese,
            Language::Korean => LanguageCode::Korean,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build a detector restricted to the languages we can narrate
pub fn build_language_detector() -> LanguageDetector {
    let languages = vec![
        Language::Vietnamese,
        Language::English,
        Language::Japanese,
        Language::Korean,
    ];

    LanguageDetectorBuilder::from_languages(&languages).build()
}

/// Detect the language of the given text
/// Returns LanguageCode or defaults to Vietnamese
pub fn detect_language(detector: &LanguageDetector, text: &str) -> LanguageCode {
    match detector.detect_language_of(text) {
        Some(language) => LanguageCode::from_lingua(language),
        None => {
            tracing::warn!("Could not detect language, falling back to Vietnamese");
            LanguageCode::Vietnamese
        }
    }
}
