//! Transcription output ingestion.
//!
//! Speech recognisers hand back loosely structured JSON. This is the one place
//! it is turned into [`TimestampedWord`]s; anything malformed is dropped here.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::TimestampedWord;

/// Top-level transcription document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTranscription {
    /// Recognised segments in order.
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

/// One recognised segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSegment {
    /// Word-level entries, absent when word timestamps were not requested.
    #[serde(default)]
    pub words: Vec<RawWord>,
}

/// One word as emitted by the recogniser.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWord {
    /// Word text, often with a leading space.
    #[serde(alias = "text")]
    pub word: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl RawTranscription {
    /// Parse a transcription document from JSON.
    pub fn from_json(json: &str, file: Option<&Path>) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::parse(e.to_string(), file.map(Path::to_path_buf)))
    }

    /// Flatten segments into validated words, in recogniser order.
    pub fn into_words(self) -> Vec<TimestampedWord> {
        let mut dropped = 0usize;
        let words: Vec<TimestampedWord> = self
            .segments
            .into_iter()
            .flat_map(|segment| segment.words)
            .filter_map(|raw| {
                let word = validate(raw);
                if word.is_none() {
                    dropped += 1;
                }
                word
            })
            .collect();

        if dropped > 0 {
            tracing::warn!("Dropped {dropped} malformed transcribed words");
        }
        words
    }
}

fn validate(raw: RawWord) -> Option<TimestampedWord> {
    let text = raw.word.trim();
    if text.is_empty() || !raw.start.is_finite() || !raw.end.is_finite() || raw.end < raw.start {
        return None;
    }
    Some(TimestampedWord::new(text, raw.start, raw.end))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn parses_whisper_style_output() {
        let json = r#"{
            "text": " Hello my friend",
            "segments": [
                {"id": 0, "text": " Hello my", "words": [
                    {"word": " Hello", "start": 0.0, "end": 0.4, "probability": 0.9},
                    {"word": " my", "start": 0.4, "end": 0.6, "probability": 0.8}
                ]},
                {"id": 1, "text": " friend"},
                {"id": 2, "words": [{"word": " friend.", "start": 0.7, "end": 1.1}]}
            ],
            "language": "en"
        }"#;
        let words = RawTranscription::from_json(json, None).unwrap().into_words();
        assert_eq!(
            words,
            vec![
                TimestampedWord::new("Hello", 0.0, 0.4),
                TimestampedWord::new("my", 0.4, 0.6),
                TimestampedWord::new("friend.", 0.7, 1.1),
            ]
        );
    }

    #[test]
    fn malformed_words_are_dropped() {
        let json = r#"{"segments": [{"words": [
            {"word": "   ", "start": 0.0, "end": 0.1},
            {"word": "back", "start": 2.0, "end": 1.0},
            {"text": "ok", "start": 3.0, "end": 3.0}
        ]}]}"#;
        let words = RawTranscription::from_json(json, None).unwrap().into_words();
        assert_eq!(words, vec![TimestampedWord::new("ok", 3.0, 3.0)]);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = RawTranscription::from_json("{not json", Some(Path::new("out.json"))).unwrap_err();
        assert!(matches!(err, Error::Parse { file: Some(_), .. }));
    }
}
