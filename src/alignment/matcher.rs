//! Word similarity scoring.

use crate::constants::alignment::TRAILING_PUNCTUATION;

/// Similarity of two words in `[0, 100]`, case-insensitive.
///
/// Indel ratio `100 * (1 - indel / (len_a + len_b))` over characters, where
/// `indel` counts the insertions and deletions needed to turn one word into
/// the other. Rounded half to even: 100 only for equal strings (both empty
/// included), 0 when exactly one side is empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    // indel = total - 2 * lcs
    let ratio = 2.0 * longest_common_subsequence(&a, &b) as f64 / total as f64;
    (ratio * 100.0).round_ties_even() as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb { diagonal + 1 } else { above.max(row[j]) };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Strip trailing `. , ! ?` from a transcribed word before scoring.
pub fn normalize_transcribed(word: &str) -> &str {
    word.trim_end_matches(TRAILING_PUNCTUATION)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn identical_words_score_100() {
        assert_eq!(similarity("friend", "friend"), 100);
        assert_eq!(similarity("Hello", "hELLo"), 100);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(similarity("", ""), 100);
        assert_eq!(similarity("", "word"), 0);
        assert_eq!(similarity("word", ""), 0);
    }

    #[test]
    fn symmetric() {
        let pairs = [("hello", "hallo"), ("night", "knight"), ("a", "abc"), ("love", "glove")];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn decreases_with_edit_distance() {
        let one = similarity("forever", "forevr");
        let two = similarity("forever", "foevr");
        let many = similarity("forever", "never");
        assert!(one > two);
        assert!(two > many);
        assert!(one < 100);
    }

    #[test]
    fn single_insertion_in_short_word() {
        assert_eq!(similarity("oh", "ohh"), 80);
        assert_eq!(similarity("go", "goo"), 80);
        assert_eq!(similarity("in", "ins"), 80);
    }

    #[test]
    fn counts_insertions_and_deletions() {
        // One substitution is a deletion plus an insertion: 2 * 4 / 10
        assert_eq!(similarity("hello", "hallo"), 80);
        assert_eq!(similarity("abcdefghij", "abcdefgxyz"), 70);
        assert_eq!(similarity("friend", "frend"), 91);
        // Non-ASCII letters count once each
        assert_eq!(similarity("café", "cafe"), 75);
    }

    #[test]
    fn close_spellings_clear_default_threshold() {
        assert!(similarity("hello", "hallo") > 70);
        assert!(similarity("hello", "world") <= 70);
    }

    #[test]
    fn trailing_punctuation_only() {
        assert_eq!(normalize_transcribed("friend!?"), "friend");
        assert_eq!(normalize_transcribed("...wait"), "...wait");
        assert_eq!(normalize_transcribed("don't,"), "don't");
    }
}
