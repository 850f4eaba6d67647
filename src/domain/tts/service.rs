use super::assembler::{AssemblyError, AudioAssembler, AudioFormat, AudioSegment, JobEvent};
use super::chunker::{char_len, split};
use super::context;
use super::dto::{Persona, TtsRequest};
use super::error::TtsServiceError;
use super::failover::{run_with_failover, FailoverPolicy};
use super::language::{build_language_detector, detect_language, LanguageCode};
use super::provider::ProviderId;
use super::voice_catalog::default_voice;
use crate::domain::credentials::CredentialPools;
use crate::infrastructure::repositories::{ImagePromptRepository, SynthesisRequest, TtsRepository};
use async_trait::async_trait;
use lingua::LanguageDetector;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// Characters of the first chunk sent to the image prompt model
const IMAGE_PROMPT_SOURCE_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct TtsSettings {
    /// Longest accepted input after cleaning, in characters
    pub max_input_chars: usize,
    /// Budget for each neighbor excerpt
    pub context_excerpt_chars: usize,
    pub failover: FailoverPolicy,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            max_input_chars: 200_000,
            context_excerpt_chars: 300,
            failover: FailoverPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TtsSynthesisResult {
    pub audio_data: Vec<u8>,
    pub format: AudioFormat,
    pub provider: ProviderId,
    pub language: LanguageCode,
    pub voice: String,
    pub char_count: usize,
    pub segment_count: usize,
    pub image_prompt: Option<String>,
}

impl TtsSynthesisResult {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

pub struct TtsService {
    providers: HashMap<ProviderId, Arc<dyn TtsRepository>>,
    pools: Arc<CredentialPools>,
    image_prompts: Option<Arc<dyn ImagePromptRepository>>,
    language_detector: LanguageDetector,
    settings: TtsSettings,
}

impl TtsService {
    pub fn new(
        providers: Vec<Arc<dyn TtsRepository>>,
        pools: Arc<CredentialPools>,
        image_prompts: Option<Arc<dyn ImagePromptRepository>>,
        settings: TtsSettings,
    ) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|repository| (repository.provider(), repository))
                .collect(),
            pools,
            image_prompts,
            language_detector: build_language_detector(),
            settings,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Narrate a long text with the requested provider
    ///
    /// This operation:
    /// - Cleans the text and splits it into provider-sized chunks
    /// - Voices each chunk in order, rotating credentials on failure
    /// - Emits one `SegmentReady` per chunk, then `Completed` or `Failed`
    ///
    /// Returns the merged artifact along with metadata
    async fn synthesize(
        &self,
        request: TtsRequest,
        events: Option<UnboundedSender<JobEvent>>,
    ) -> Result<Arc<TtsSynthesisResult>, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize(
        &self,
        request: TtsRequest,
        events: Option<UnboundedSender<JobEvent>>,
    ) -> Result<Arc<TtsSynthesisResult>, TtsServiceError> {
        let outcome = self.run_job(&request, events.as_ref()).await;

        if let Some(events) = &events {
            let event = match &outcome {
                Ok(result) => JobEvent::Completed(result.clone()),
                Err(err) => JobEvent::failed(err),
            };
            let _ = events.send(event);
        }

        if let Err(err) = &outcome {
            tracing::warn!(
                provider = %request.provider,
                category = err.category(),
                error = %err,
                "TTS job failed"
            );
        }

        outcome
    }
}

impl TtsService {
    async fn run_job(
        &self,
        request: &TtsRequest,
        events: Option<&UnboundedSender<JobEvent>>,
    ) -> Result<Arc<TtsSynthesisResult>, TtsServiceError> {
        let start_time = Instant::now();
        let provider = request.provider;

        // 1. Clean and validate the text
        let text = super::text::prepare_text(&request.text);
        if text.is_empty() {
            return Err(TtsServiceError::Invalid("text is empty".to_string()));
        }
        let char_count = char_len(&text);
        if char_count > self.settings.max_input_chars {
            return Err(TtsServiceError::Invalid(format!(
                "text has {} characters, the limit is {}",
                char_count, self.settings.max_input_chars
            )));
        }

        let repository = self.providers.get(&provider).cloned().ok_or_else(|| {
            TtsServiceError::Invalid(format!("provider {} is not available", provider))
        })?;

        // 2. Resolve language and voice
        let language = request
            .language
            .unwrap_or_else(|| detect_language(&self.language_detector, &text));
        let voice = self.resolve_voice(provider, language, request.voice.as_deref())?;
        let persona = Persona::from_request(request);

        tracing::info!(
            provider = %provider,
            language = %language,
            voice = %voice,
            original_length = request.text.len(),
            char_count,
            "TTS job accepted"
        );

        // 3. Fail fast without credentials
        let pool = self
            .pools
            .get(provider)
            .ok_or(TtsServiceError::Unconfigured(provider))?;
        if !self.pools.is_configured(provider) {
            return Err(TtsServiceError::Unconfigured(provider));
        }

        // 4. Chunk and voice sequentially
        let chunks = split(&text, repository.max_chunk_chars());
        tracing::info!(
            provider = %provider,
            chunk_count = chunks.len(),
            max_chunk_chars = repository.max_chunk_chars(),
            "Text split into chunks"
        );

        let mut assembler =
            AudioAssembler::new(repository.audio_format(), chunks.len(), events.cloned());
        let driver = repository.as_ref();

        for chunk in &chunks {
            let context = context::build(&chunks, chunk.index, self.settings.context_excerpt_chars);
            let synthesis = SynthesisRequest {
                text: &chunk.content,
                language,
                voice_id: &voice,
                persona: &persona,
                context: &context,
                model: request.model.as_deref(),
            };

            let audio = {
                // Held for the whole retry cycle of this chunk
                let mut pool = pool.lock().await;
                run_with_failover(
                    &mut pool,
                    chunk.index,
                    &self.settings.failover,
                    |credential| async move { driver.synthesize(&synthesis, &credential).await },
                )
                .await?
            };

            tracing::info!(
                provider = %provider,
                chunk_index = chunk.index,
                total = chunks.len(),
                audio_size_bytes = audio.len(),
                "Segment ready"
            );

            assembler.push(AudioSegment {
                id: chunk.index,
                source_text: chunk.content.clone(),
                audio_payload: audio,
            });
        }

        // 5. Merge
        let merged = assembler.finish().map_err(|err| match err {
            AssemblyError::NoSegments => TtsServiceError::EmptyResult {
                provider,
                reason: "no segments were produced".to_string(),
            },
            AssemblyError::Wav(e) => TtsServiceError::Other(anyhow::anyhow!(e)),
        })?;

        // 6. Optional image prompt, best effort
        let image_prompt = if request.image_prompt {
            match chunks.first() {
                Some(first) => self.image_prompt(&first.content).await,
                None => None,
            }
        } else {
            None
        };

        let result = Arc::new(TtsSynthesisResult {
            audio_data: merged.bytes,
            format: merged.format,
            provider,
            language,
            voice,
            char_count,
            segment_count: merged.segment_count,
            image_prompt,
        });

        tracing::info!(
            provider = %provider,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = char_count,
            segment_count = result.segment_count,
            audio_size_bytes = result.audio_data.len(),
            "TTS job completed"
        );

        Ok(result)
    }

    fn resolve_voice(
        &self,
        provider: ProviderId,
        language: LanguageCode,
        requested: Option<&str>,
    ) -> Result<String, TtsServiceError> {
        match requested.map(str::trim).filter(|voice| !voice.is_empty()) {
            Some(voice) => Ok(voice.to_string()),
            None => default_voice(provider, language)
                .map(str::to_string)
                .ok_or_else(|| {
                    TtsServiceError::Invalid(format!(
                        "no default {} voice for {}",
                        provider, language
                    ))
                }),
        }
    }

    /// Scene prompt for a thumbnail; failures only log
    async fn image_prompt(&self, source: &str) -> Option<String> {
        let repository = self.image_prompts.as_ref()?;
        let pool = self.pools.get(repository.provider())?;
        let source: String = source.chars().take(IMAGE_PROMPT_SOURCE_CHARS).collect();
        let generator = repository.as_ref();
        let source = source.as_str();

        let mut pool = pool.lock().await;
        match run_with_failover(&mut pool, 0, &self.settings.failover, |credential| async move {
            generator.generate_image_prompt(source, &credential).await
        })
        .await
        {
            Ok(prompt) => Some(prompt),
            Err(err) => {
                tracing::warn!(error = %err, "Image prompt generation failed");
                None
            }
        }
    }
}
