pub mod assembler;
pub mod chunker;
pub mod context;
pub mod dto;
pub mod error;
pub mod failover;
pub mod language;
pub mod provider;
pub mod service;
pub mod text;
pub mod voice_catalog;

pub use assembler::{AudioAssembler, AudioFormat, AudioSegment, JobEvent, MergedAudio};
pub use chunker::{split, TextChunk};
pub use context::SynthesisContext;
pub use dto::{Persona, TtsRequest};
pub use error::TtsServiceError;
pub use failover::{run_with_failover, FailoverError, FailoverPolicy};
pub use language::{build_language_detector, detect_language, LanguageCode};
pub use provider::ProviderId;
pub use service::{TtsService, TtsServiceApi, TtsSettings, TtsSynthesisResult};
