use std::io::Cursor;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::sync::mpsc::UnboundedSender;

use super::error::TtsServiceError;
use super::service::TtsSynthesisResult;

/// Size of the RIFF/WAVE header written in front of merged PCM audio
pub const WAV_HEADER_LEN: usize = 44;

/// Audio encoding returned by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Headerless signed 16-bit little-endian PCM
    Pcm16 { sample_rate: u32, channels: u16 },
    Mp3,
}

impl AudioFormat {
    /// MIME type of the assembled artifact
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Pcm16 { .. } => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            AudioFormat::Pcm16 { .. } => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    /// Concatenate payloads in order into one playable file.
    ///
    /// PCM gets exactly one WAV header for the whole artifact; MP3 frames are
    /// self-delimiting and are joined as they are.
    pub fn encode<'a, I>(&self, payloads: I) -> Result<Vec<u8>, AssemblyError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        match *self {
            AudioFormat::Mp3 => Ok(payloads
                .into_iter()
                .flat_map(|payload| payload.iter().copied())
                .collect()),
            AudioFormat::Pcm16 {
                sample_rate,
                channels,
            } => {
                let spec = WavSpec {
                    channels,
                    sample_rate,
                    bits_per_sample: 16,
                    sample_format: SampleFormat::Int,
                };

                let mut wav_buffer = Cursor::new(Vec::new());
                {
                    let mut writer = WavWriter::new(&mut wav_buffer, spec)?;
                    for payload in payloads {
                        if payload.len() % 2 != 0 {
                            tracing::warn!(
                                payload_size = payload.len(),
                                "PCM payload has an odd byte count, dropping the trailing byte"
                            );
                        }
                        for sample in payload.chunks_exact(2) {
                            writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
                        }
                    }
                    writer.finalize()?;
                }

                Ok(wav_buffer.into_inner())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("no audio segments were produced")]
    NoSegments,
    #[error("failed to write WAV container: {0}")]
    Wav(#[from] hound::Error),
}

/// Audio for exactly one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    /// Equal to the index of the chunk it was synthesized from
    pub id: usize,
    pub source_text: String,
    pub audio_payload: Vec<u8>,
}

/// Progress notifications for one generation job, in emission order
#[derive(Debug, Clone)]
pub enum JobEvent {
    SegmentReady {
        segment: Arc<AudioSegment>,
        total: usize,
        format: AudioFormat,
    },
    Completed(Arc<TtsSynthesisResult>),
    Failed {
        category: &'static str,
        message: String,
    },
}

impl JobEvent {
    pub fn failed(error: &TtsServiceError) -> Self {
        JobEvent::Failed {
            category: error.category(),
            message: error.to_string(),
        }
    }
}

/// Merged artifact for a finished job
#[derive(Debug, Clone)]
pub struct MergedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    pub segment_count: usize,
}

/// Collects segments in chunk order and merges them at the end of a job
pub struct AudioAssembler {
    format: AudioFormat,
    expected: usize,
    segments: Vec<Arc<AudioSegment>>,
    events: Option<UnboundedSender<JobEvent>>,
}

impl AudioAssembler {
    pub fn new(
        format: AudioFormat,
        expected: usize,
        events: Option<UnboundedSender<JobEvent>>,
    ) -> Self {
        Self {
            format,
            expected,
            segments: Vec::with_capacity(expected),
            events,
        }
    }

    /// Store a finished segment and notify listeners before returning
    pub fn push(&mut self, segment: AudioSegment) {
        debug_assert_eq!(
            segment.id,
            self.segments.len(),
            "segments must arrive in chunk order"
        );

        let segment = Arc::new(segment);

        if let Some(events) = &self.events {
            // A listener that went away does not stop the job
            let _ = events.send(JobEvent::SegmentReady {
                segment: segment.clone(),
                total: self.expected,
                format: self.format,
            });
        }

        self.segments.push(segment);
    }

    /// Merge every collected segment into one artifact
    pub fn finish(self) -> Result<MergedAudio, AssemblyError> {
        if self.segments.is_empty() {
            return Err(AssemblyError::NoSegments);
        }

        let bytes = self.format.encode(
            self.segments
                .iter()
                .map(|segment| segment.audio_payload.as_slice()),
        )?;

        Ok(MergedAudio {
            bytes,
            format: self.format,
            segment_count: self.segments.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const GEMINI_PCM: AudioFormat = AudioFormat::Pcm16 {
        sample_rate: 24_000,
        channels: 1,
    };

    fn segment(id: usize, payload: Vec<u8>) -> AudioSegment {
        AudioSegment {
            id,
            source_text: format!("chunk {}", id),
            audio_payload: payload,
        }
    }

    #[test]
    fn test_mp3_segments_are_concatenated_without_header() {
        let mut assembler = AudioAssembler::new(AudioFormat::Mp3, 2, None);
        assembler.push(segment(0, vec![1, 2, 3]));
        assembler.push(segment(1, vec![4, 5]));

        let merged = assembler.finish().unwrap();

        assert_eq!(merged.bytes, vec![1, 2, 3, 4, 5]);
        assert_eq!(merged.segment_count, 2);
    }

    #[test]
    fn test_pcm_segments_get_a_single_wav_header() {
        let payloads = vec![vec![0u8, 1, 2, 3], vec![4, 5, 6, 7, 8, 9], vec![10, 11]];
        let total: usize = payloads.iter().map(Vec::len).sum();

        let mut assembler = AudioAssembler::new(GEMINI_PCM, payloads.len(), None);
        for (id, payload) in payloads.iter().enumerate() {
            assembler.push(segment(id, payload.clone()));
        }
        let merged = assembler.finish().unwrap();

        assert_eq!(merged.bytes.len(), total + WAV_HEADER_LEN);
        assert_eq!(&merged.bytes[0..4], b"RIFF");
        assert_eq!(&merged.bytes[8..12], b"WAVE");
        // sample data follows the header in chunk order
        assert_eq!(&merged.bytes[WAV_HEADER_LEN..], &(0u8..12).collect::<Vec<_>>()[..]);

        let reader = hound::WavReader::new(Cursor::new(merged.bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.duration() as usize, total / 2);
    }

    #[test]
    fn test_finish_without_segments_is_an_error() {
        let assembler = AudioAssembler::new(AudioFormat::Mp3, 0, None);
        assert!(matches!(assembler.finish(), Err(AssemblyError::NoSegments)));
    }

    #[test]
    fn test_push_notifies_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut assembler = AudioAssembler::new(AudioFormat::Mp3, 3, Some(tx));

        for id in 0..3 {
            assembler.push(segment(id, vec![id as u8]));
            // notification is delivered before push returns
            match rx.try_recv().unwrap() {
                JobEvent::SegmentReady { segment, total, .. } => {
                    assert_eq!(segment.id, id);
                    assert_eq!(total, 3);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(assembler.finish().unwrap().segment_count, 3);
    }

    #[test]
    fn test_push_survives_dropped_listener() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut assembler = AudioAssembler::new(AudioFormat::Mp3, 1, Some(tx));
        assembler.push(segment(0, vec![9]));
        assert_eq!(assembler.finish().unwrap().bytes, vec![9]);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(GEMINI_PCM.mime_type(), "audio/wav");
        assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
        assert_eq!(AudioFormat::Mp3.file_extension(), "mp3");
    }
}
