//! Reference-to-transcription word alignment.
//!
//! Matches every reference lyric word against a bounded window of transcribed
//! words and keeps the timestamps of the best sufficiently similar candidate.

mod builder;
mod matcher;

pub use builder::{AlignmentBuilder, AlignmentConfig};
pub use matcher::{normalize_transcribed, similarity};
