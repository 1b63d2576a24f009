//! Audio preprocessing and transcription collaborators.
//!
//! The synchronization job runs three stages in order: vocal isolation,
//! optional silence trimming, and transcription with word timestamps. Each
//! stage sits behind a trait so the job can be driven by real tools or by
//! test doubles.

mod commands;
mod silence;
mod timeline;
mod transcript;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{Error, Result, Stage};
use crate::types::TimestampedWord;

pub use commands::{DemucsIsolator, WhisperCliTranscriber};
pub use silence::{kept_frames, WavSilenceTrimmer};
pub use timeline::{KeptSegment, TimelineMap};
pub use transcript::{RawSegment, RawTranscription, RawWord};

/// Silence detection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceParams {
    /// Minimum length of a quiet stretch to remove.
    pub min_silence_ms: u32,
    /// Loudness below which audio counts as silent, dBFS.
    pub threshold_db: f32,
}

/// Output of silence trimming.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedAudio {
    /// The trimmed audio file.
    pub path: PathBuf,
    /// Maps trimmed times back to the input's timeline.
    pub timeline: TimelineMap,
}

/// Separates vocals from a mixed recording.
#[async_trait]
pub trait VocalIsolator: Send + Sync {
    /// Write a vocals-only file under `work_dir` and return its path.
    async fn isolate_vocals(&self, audio: &Path, work_dir: &Path) -> Result<PathBuf>;
}

/// Removes silent stretches from an audio file.
#[async_trait]
pub trait SilenceTrimmer: Send + Sync {
    /// Write a trimmed file under `work_dir`.
    async fn trim_silence(&self, audio: &Path, work_dir: &Path, params: SilenceParams) -> Result<TrimmedAudio>;
}

/// Speech-to-text with word-level timestamps.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe `audio`; timestamps are relative to that file.
    async fn transcribe(&self, audio: &Path, work_dir: &Path) -> Result<RawTranscription>;
}

/// The full preprocessing chain used by a synchronization job.
#[derive(Clone)]
pub struct Pipeline {
    isolator: Arc<dyn VocalIsolator>,
    trimmer: Option<Arc<dyn SilenceTrimmer>>,
    transcriber: Arc<dyn Transcriber>,
    silence: SilenceParams,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("trims_silence", &self.trimmer.is_some())
            .field("silence", &self.silence)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Assemble a pipeline from its stages. Pass `None` to skip trimming.
    pub fn new(
        isolator: Arc<dyn VocalIsolator>,
        trimmer: Option<Arc<dyn SilenceTrimmer>>,
        transcriber: Arc<dyn Transcriber>,
        silence: SilenceParams,
    ) -> Self {
        Self { isolator, trimmer, transcriber, silence }
    }

    /// The stock pipeline: demucs, in-process trimming, whisper CLI.
    pub fn from_config(config: &Config) -> Self {
        let trimmer: Option<Arc<dyn SilenceTrimmer>> =
            config.trim_silence.then(|| Arc::new(WavSilenceTrimmer) as Arc<dyn SilenceTrimmer>);
        Self::new(
            Arc::new(DemucsIsolator::new(&config.demucs_bin, &config.demucs_model)),
            trimmer,
            Arc::new(WhisperCliTranscriber::new(&config.whisper_bin, &config.whisper_model)),
            SilenceParams {
                min_silence_ms: config.min_silence_ms,
                threshold_db: config.silence_threshold_db,
            },
        )
    }

    /// Run every stage on `music` and return words on the original timeline.
    ///
    /// An empty transcription is a failure: there is nothing to align.
    pub async fn transcribe_words(&self, music: &Path) -> Result<Vec<TimestampedWord>> {
        let work_dir = tempfile::Builder::new()
            .prefix("lyricsync-")
            .tempdir()
            .map_err(|e| Error::pipeline(Stage::VocalIsolation, format!("creating work directory: {e}")))?;

        let started = Instant::now();
        let vocals = self
            .isolator
            .isolate_vocals(music, work_dir.path())
            .await
            .map_err(|e| e.in_stage(Stage::VocalIsolation))?;
        tracing::info!("Isolated vocals in {:?}", started.elapsed());

        let (audio, timeline) = match &self.trimmer {
            Some(trimmer) => {
                let started = Instant::now();
                let trimmed = trimmer
                    .trim_silence(&vocals, work_dir.path(), self.silence)
                    .await
                    .map_err(|e| e.in_stage(Stage::SilenceTrimming))?;
                tracing::info!("Trimmed silence in {:?}", started.elapsed());
                (trimmed.path, trimmed.timeline)
            }
            None => (vocals, TimelineMap::identity()),
        };

        let started = Instant::now();
        let words = self
            .transcriber
            .transcribe(&audio, work_dir.path())
            .await
            .map_err(|e| e.in_stage(Stage::Transcription))?
            .into_words();
        tracing::info!("Transcribed {} words in {:?}", words.len(), started.elapsed());

        if words.is_empty() {
            return Err(Error::pipeline(Stage::Transcription, "no words were recognised"));
        }

        if timeline.is_identity() {
            Ok(words)
        } else {
            Ok(words.iter().map(|w| timeline.remap_word(w)).collect())
        }
    }
}
