pub mod credentials;
pub mod tts;
