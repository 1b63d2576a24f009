//! Windowed best-candidate alignment.

use crate::constants::alignment::{DEFAULT_MATCH_THRESHOLD, DEFAULT_WINDOW_RADIUS};
use crate::types::{AlignmentEntry, AlignmentTable, ReferenceWord, TimestampedWord};

use super::matcher::{normalize_transcribed, similarity};

/// Tunable alignment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentConfig {
    /// Transcribed words searched on each side of the reference index.
    pub window_radius: usize,
    /// Best score must be strictly greater than this to emit an entry.
    pub match_threshold: u8,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            window_radius: DEFAULT_WINDOW_RADIUS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// Builds an [`AlignmentTable`] from reference words and a transcription.
///
/// The search window assumes transcription order roughly tracks lyric order,
/// which keeps the cost at `O(reference words * 2 * radius)`. Reference
/// words without an acceptable candidate are left out of the table.
#[derive(Debug, Clone, Default)]
pub struct AlignmentBuilder {
    config: AlignmentConfig,
}

impl AlignmentBuilder {
    /// Create a builder with the given policy.
    pub const fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    /// Align `reference` against `transcribed`.
    pub fn build(&self, reference: &[ReferenceWord], transcribed: &[TimestampedWord]) -> AlignmentTable {
        if transcribed.is_empty() {
            return AlignmentTable::empty();
        }

        let entries: Vec<AlignmentEntry> = reference
            .iter()
            .enumerate()
            .filter_map(|(i, word)| {
                let (candidate, score) = self.best_candidate(i, &word.text, transcribed)?;
                (score > self.config.match_threshold).then(|| AlignmentEntry {
                    start: candidate.start,
                    end: candidate.end,
                    text: word.text.clone(),
                    original_index: i,
                })
            })
            .collect();

        tracing::debug!(
            "Aligned {} of {} reference words against {} transcribed words",
            entries.len(),
            reference.len(),
            transcribed.len()
        );

        // Entries come out in increasing index order, so this cannot fail
        AlignmentTable::new(entries).unwrap_or_default()
    }

    /// First candidate reaching the highest score in the window around `index`.
    fn best_candidate<'a>(
        &self,
        index: usize,
        text: &str,
        transcribed: &'a [TimestampedWord],
    ) -> Option<(&'a TimestampedWord, u8)> {
        let lo = index.saturating_sub(self.config.window_radius);
        let hi = index.saturating_add(self.config.window_radius).min(transcribed.len());
        let window = transcribed.get(lo..hi)?;

        let mut best: Option<(&TimestampedWord, u8)> = None;
        for candidate in window {
            let score = similarity(text, normalize_transcribed(&candidate.text));
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::types::tokenize_reference;

    fn words(items: &[(&str, f64, f64)]) -> Vec<TimestampedWord> {
        items.iter().map(|(t, s, e)| TimestampedWord::new(*t, *s, *e)).collect()
    }

    #[test]
    fn empty_transcription_gives_empty_table() {
        let table = AlignmentBuilder::default().build(&tokenize_reference("a b c"), &[]);
        assert!(table.is_empty());
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let reference = tokenize_reference("la");
        let transcribed = words(&[("la", 1.0, 2.0), ("la", 3.0, 4.0)]);
        let table = AlignmentBuilder::default().build(&reference, &transcribed);
        assert_eq!(table.entries()[0].start, 1.0);
    }

    #[test]
    fn repeated_word_takes_first_equal_candidate_in_window() {
        let reference = tokenize_reference("hello my friend hello");
        let transcribed = words(&[("hello", 0.0, 1.0), ("my", 1.0, 2.0), ("friend", 2.0, 3.0), ("hello", 5.0, 6.0)]);
        let table = AlignmentBuilder::default().build(&reference, &transcribed);

        let expected = AlignmentTable::new(vec![
            AlignmentEntry { start: 0.0, end: 1.0, text: "hello".into(), original_index: 0 },
            AlignmentEntry { start: 1.0, end: 2.0, text: "my".into(), original_index: 1 },
            AlignmentEntry { start: 2.0, end: 3.0, text: "friend".into(), original_index: 2 },
            // Both "hello"s score 100 and the window [0, 4) holds both; the
            // earlier one wins the tie
            AlignmentEntry { start: 0.0, end: 1.0, text: "hello".into(), original_index: 3 },
        ])
        .unwrap();
        assert_eq!(table.entries(), expected.entries());
    }

    #[test]
    fn repeated_word_outside_earlier_window_keeps_its_own_timestamps() {
        // 16 filler words push the first "hello" out of the last one's window
        let filler: Vec<String> = (0..16).map(|i| format!("la{i}")).collect();
        let lyrics = format!("hello {} hello", filler.join(" "));
        let reference = tokenize_reference(&lyrics);

        let mut transcribed = words(&[("hello", 0.0, 1.0)]);
        transcribed.extend(filler.iter().zip(1_u32..).map(|(w, i)| TimestampedWord::new(w.clone(), f64::from(i), f64::from(i) + 0.5)));
        transcribed.push(TimestampedWord::new("hello", 20.0, 21.0));

        let table = AlignmentBuilder::default().build(&reference, &transcribed);
        let last = table.entries().last().unwrap();
        assert_eq!(last.original_index, 17);
        assert_eq!((last.start, last.end), (20.0, 21.0));
    }

    #[test]
    fn score_equal_to_threshold_is_rejected() {
        let reference = tokenize_reference("abcdefghij");
        // 3 substitutions out of 10 characters -> exactly 70
        let transcribed = words(&[("abcdefgxyz", 0.0, 1.0)]);
        let strict = AlignmentBuilder::new(AlignmentConfig { window_radius: 15, match_threshold: 70 });
        assert!(strict.build(&reference, &transcribed).is_empty());

        let lenient = AlignmentBuilder::new(AlignmentConfig { window_radius: 15, match_threshold: 69 });
        assert_eq!(lenient.build(&reference, &transcribed).len(), 1);
    }

    #[test]
    fn window_bounds_the_search() {
        // Reference word 20 has its only exact match at transcribed index 0,
        // which lies outside [5, 35)
        let mut text: Vec<String> = (0..20).map(|i| format!("w{i}")).collect();
        text.push("target".to_string());
        let reference = tokenize_reference(&text.join(" "));

        let mut transcribed = words(&[("target", 0.0, 0.5)]);
        transcribed.extend((1..40_u32).map(|i| TimestampedWord::new(format!("zz{i}"), f64::from(i), f64::from(i) + 0.5)));

        let table = AlignmentBuilder::default().build(&reference, &transcribed);
        assert!(table.entries().iter().all(|e| e.original_index != 20));

        let wide = AlignmentBuilder::new(AlignmentConfig { window_radius: 25, match_threshold: 70 });
        let table = wide.build(&reference, &transcribed);
        assert!(table.entries().iter().any(|e| e.original_index == 20 && e.start == 0.0));
    }

    #[test]
    fn reference_beyond_transcription_finds_nothing() {
        // Window for index 40 is [25, 3) and therefore empty
        let text: Vec<String> = (0..41).map(|i| format!("w{i}")).collect();
        let reference = tokenize_reference(&text.join(" "));
        let transcribed = words(&[("w40", 0.0, 1.0), ("w1", 1.0, 2.0), ("w2", 2.0, 3.0)]);
        let table = AlignmentBuilder::default().build(&reference, &transcribed);
        assert!(table.entries().iter().all(|e| e.original_index < 40));
    }
}
