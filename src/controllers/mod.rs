pub mod catalog;
pub mod credentials;
pub mod health;
pub mod tts;
