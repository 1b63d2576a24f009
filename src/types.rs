//! Core data model.
//!
//! Timestamped transcription words, reference lyric words, and the sparse
//! alignment table that links the two.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A word hypothesis from speech recognition, with times in seconds.
///
/// Always satisfies `start <= end` once it has passed transcript ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedWord {
    /// Recognised text, surrounding whitespace removed.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl TimestampedWord {
    /// Create a new word.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self { text: text.into(), start, end }
    }
}

/// A whitespace-delimited token of the reference lyric text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceWord {
    /// Token text, punctuation kept as typed.
    pub text: String,
    /// 0-based position in the split sequence.
    pub original_index: usize,
}

/// Split reference lyrics on whitespace, in document order.
pub fn tokenize_reference(text: &str) -> Vec<ReferenceWord> {
    text.split_whitespace()
        .enumerate()
        .map(|(original_index, word)| ReferenceWord {
            text: word.to_string(),
            original_index,
        })
        .collect()
}

/// One matched reference word with the timestamps of its chosen candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentEntry {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// The reference word's text.
    pub text: String,
    /// Index of the reference word in the tokenized lyrics.
    pub original_index: usize,
}

impl AlignmentEntry {
    /// Whether `t` falls inside `[start, end]`, both ends inclusive.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Ordered, sparse result of an alignment run.
///
/// Entries are strictly increasing in `original_index` but their times are
/// not guaranteed to be monotonic. The table is immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentTable {
    entries: Vec<AlignmentEntry>,
    /// `prefix_max_end[i]` is the largest `end` among `entries[..i]`.
    prefix_max_end: Vec<f64>,
}

impl AlignmentTable {
    /// Build a table, returning `None` if `original_index` is not strictly increasing.
    pub fn new(entries: Vec<AlignmentEntry>) -> Option<Self> {
        let ordered = entries
            .windows(2)
            .all(|pair| pair[0].original_index < pair[1].original_index);
        if !ordered {
            return None;
        }

        let mut prefix_max_end = Vec::with_capacity(entries.len());
        let mut running = f64::NEG_INFINITY;
        for entry in &entries {
            prefix_max_end.push(running);
            running = running.max(entry.end);
        }

        Some(Self { entries, prefix_max_end })
    }

    /// An empty table.
    pub const fn empty() -> Self {
        Self { entries: Vec::new(), prefix_max_end: Vec::new() }
    }

    /// All entries in order.
    pub fn entries(&self) -> &[AlignmentEntry] {
        &self.entries
    }

    /// Entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&AlignmentEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the first entry whose interval contains `t`.
    pub fn first_containing(&self, t: f64) -> Option<usize> {
        self.entries.iter().position(|entry| entry.contains(t))
    }

    /// Same result as [`first_containing`](Self::first_containing), probing
    /// `probe_len` entries from `hint` before falling back to a full scan.
    ///
    /// A probed entry is only accepted when every earlier entry ends before
    /// `t`, so no earlier entry could have matched.
    pub fn first_containing_from(&self, t: f64, hint: usize, probe_len: usize) -> Option<usize> {
        let probe_end = hint.saturating_add(probe_len).min(self.entries.len());
        for index in hint.min(probe_end)..probe_end {
            if self.prefix_max_end[index] >= t {
                break;
            }
            if self.entries[index].contains(t) {
                return Some(index);
            }
        }
        self.first_containing(t)
    }
}

/// Identifier of a song in the library (the audio file's stem).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongId(pub String);

impl SongId {
    /// Create a new `SongId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SongId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A playable song: audio plus its reference lyrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Library identifier.
    pub id: SongId,
    /// Human-readable title.
    pub title: String,
    /// Audio file.
    pub music_path: PathBuf,
    /// Plain-text reference lyrics.
    pub lyrics_path: PathBuf,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn entry(start: f64, end: f64, text: &str, original_index: usize) -> AlignmentEntry {
        AlignmentEntry { start, end, text: text.to_string(), original_index }
    }

    #[test]
    fn tokenize_keeps_punctuation_and_order() {
        let words = tokenize_reference("Hello,  my\nfriend!\t");
        let texts: Vec<_> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["Hello,", "my", "friend!"]);
        assert_eq!(words[2].original_index, 2);
    }

    #[test]
    fn table_rejects_unordered_indices() {
        assert!(AlignmentTable::new(vec![entry(0.0, 1.0, "a", 1), entry(1.0, 2.0, "b", 1)]).is_none());
        assert!(AlignmentTable::new(vec![entry(0.0, 1.0, "a", 0), entry(1.0, 2.0, "b", 3)]).is_some());
    }

    #[test]
    fn first_containing_prefers_lowest_index() {
        // Non-monotonic times: entry 2 overlaps entry 0
        let table = AlignmentTable::new(vec![
            entry(4.0, 6.0, "a", 0),
            entry(1.0, 2.0, "b", 1),
            entry(5.0, 5.5, "c", 2),
        ])
        .unwrap();
        assert_eq!(table.first_containing(5.2), Some(0));
        assert_eq!(table.first_containing(3.0), None);
        assert_eq!(table.first_containing(2.0), Some(1));
    }

    #[test]
    fn probe_agrees_with_full_scan() {
        let table = AlignmentTable::new(vec![
            entry(0.0, 1.0, "a", 0),
            entry(1.0, 2.0, "b", 1),
            entry(9.0, 9.5, "c", 2),
            entry(2.0, 3.0, "d", 3),
            entry(3.0, 4.0, "e", 4),
        ])
        .unwrap();
        for hint in 0..table.len() + 2 {
            for step in 0..20_u32 {
                let t = f64::from(step) * 0.5;
                assert_eq!(
                    table.first_containing_from(t, hint, 3),
                    table.first_containing(t),
                    "t={t} hint={hint}"
                );
            }
        }
    }
}
