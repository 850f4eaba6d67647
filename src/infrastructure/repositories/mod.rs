pub mod credential_repository;
pub mod elevenlabs_tts_repository;
pub mod gemini_tts_repository;
pub mod tts_repository;

pub use credential_repository::{
    CredentialRepository, CredentialStoreError, FileCredentialRepository,
    InMemoryCredentialRepository, StoredCredentials,
};
pub use elevenlabs_tts_repository::{ElevenLabsSettings, ElevenLabsTtsRepository};
pub use gemini_tts_repository::{GeminiSettings, GeminiTtsRepository};
pub use tts_repository::{
    FailureKind, ImagePromptRepository, ProviderError, SynthesisRequest, TtsRepository,
};
