//! Mapping between a silence-trimmed timeline and the original recording.
//!
//! Trimming removes stretches of audio, so a time reported against the
//! trimmed file is earlier than the same moment in the original. Playback
//! runs on the original, so transcribed times are mapped back before use.

use crate::types::TimestampedWord;

/// A stretch of the original audio kept by trimming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeptSegment {
    /// Where the segment starts in the original, seconds.
    pub original_start: f64,
    /// Where the segment starts in the trimmed output, seconds.
    pub trimmed_start: f64,
    /// Segment length, seconds.
    pub duration: f64,
}

/// Piecewise-linear map from trimmed time to original time.
///
/// An empty map is the identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineMap {
    segments: Vec<KeptSegment>,
}

impl TimelineMap {
    /// The identity map, for audio that was not trimmed.
    pub const fn identity() -> Self {
        Self { segments: Vec::new() }
    }

    /// Build a map from kept `(original_start, original_end)` spans in order.
    pub fn from_kept_spans(spans: &[(f64, f64)]) -> Self {
        let mut trimmed_start = 0.0;
        let segments = spans
            .iter()
            .map(|&(start, end)| {
                let duration = (end - start).max(0.0);
                let segment = KeptSegment { original_start: start, trimmed_start, duration };
                trimmed_start += duration;
                segment
            })
            .collect();
        Self { segments }
    }

    /// Kept segments in order.
    pub fn segments(&self) -> &[KeptSegment] {
        &self.segments
    }

    /// Whether this map leaves times unchanged.
    pub fn is_identity(&self) -> bool {
        self.segments.is_empty()
    }

    /// Map a trimmed-timeline time to the original timeline.
    ///
    /// Times past the last segment are extended from its end.
    pub fn to_original(&self, trimmed: f64) -> f64 {
        if self.segments.is_empty() {
            return trimmed;
        }
        let idx = self
            .segments
            .partition_point(|s| s.trimmed_start + s.duration <= trimmed)
            .min(self.segments.len() - 1);
        let segment = &self.segments[idx];
        segment.original_start + (trimmed - segment.trimmed_start)
    }

    /// Map a word's start and end to the original timeline.
    pub fn remap_word(&self, word: &TimestampedWord) -> TimestampedWord {
        let start = self.to_original(word.start);
        // Keep start <= end when a word straddles a cut
        let end = self.to_original(word.end).max(start);
        TimestampedWord::new(word.text.clone(), start, end)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn identity_leaves_times_alone() {
        let map = TimelineMap::identity();
        assert!(map.is_identity());
        assert_eq!(map.to_original(12.5), 12.5);
    }

    #[test]
    fn maps_across_removed_silence() {
        // Kept 1..3 and 6..8 of the original; trimmed file is 4s long
        let map = TimelineMap::from_kept_spans(&[(1.0, 3.0), (6.0, 8.0)]);
        assert_eq!(map.to_original(0.0), 1.0);
        assert_eq!(map.to_original(1.5), 2.5);
        assert_eq!(map.to_original(2.0), 6.0);
        assert_eq!(map.to_original(3.5), 7.5);
        assert_eq!(map.to_original(5.0), 9.0);
    }

    #[test]
    fn remapped_word_keeps_order() {
        let map = TimelineMap::from_kept_spans(&[(0.0, 1.0), (5.0, 6.0)]);
        let word = map.remap_word(&TimestampedWord::new("hey", 0.5, 1.5));
        assert_eq!(word.start, 0.5);
        assert_eq!(word.end, 5.5);
    }
}
