//! Application error types.
//!
//! Provides unified error handling with actionable context for debugging.

use std::fmt;
use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// A step of the synchronization pipeline, used to say where a job failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the reference lyric file.
    ReadLyrics,
    /// Separating vocals from the mixed recording.
    VocalIsolation,
    /// Removing silent stretches from the vocal track.
    SilenceTrimming,
    /// Speech-to-text with word timestamps.
    Transcription,
    /// Matching reference words to transcribed words.
    Alignment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadLyrics => "reading lyrics",
            Self::VocalIsolation => "vocal isolation",
            Self::SilenceTrimming => "silence trimming",
            Self::Transcription => "transcription",
            Self::Alignment => "alignment",
        };
        f.write_str(name)
    }
}

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// File parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<std::path::PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// A synchronization pipeline stage failed
    #[error("Synchronization failed during {stage}: {message}")]
    Pipeline {
        /// The stage that failed.
        stage: Stage,
        /// Description of the failure.
        message: String,
    },

    /// Audio transport error (player process could not be started or stopped)
    #[error("Playback error: {0}")]
    Transport(String),

    /// Song library error
    #[error("Library error: {0}")]
    Library(String),

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// Create a pipeline failure for the given stage
    pub fn pipeline(stage: Stage, message: impl fmt::Display) -> Self {
        Self::Pipeline { stage, message: message.to_string() }
    }

    /// Re-tag an error as a failure of `stage`, keeping pipeline errors as they are.
    #[must_use]
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::Pipeline { .. } => self,
            other => Self::pipeline(stage, other),
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn pipeline_error_names_the_stage() {
        let err = Error::pipeline(Stage::Transcription, "model not found");
        assert_eq!(err.to_string(), "Synchronization failed during transcription: model not found");
    }

    #[test]
    fn in_stage_wraps_foreign_errors_once() {
        let err = Error::from("boom").in_stage(Stage::VocalIsolation);
        match &err {
            Error::Pipeline { stage, message } => {
                assert_eq!(*stage, Stage::VocalIsolation);
                assert_eq!(message, "boom");
            }
            _ => panic!("Expected Pipeline error"),
        }

        // Already tagged errors keep their original stage
        match err.in_stage(Stage::Alignment) {
            Error::Pipeline { stage, .. } => assert_eq!(stage, Stage::VocalIsolation),
            _ => panic!("Expected Pipeline error"),
        }
    }
}
