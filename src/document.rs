//! The displayed lyric text and its highlight.
//!
//! Offsets are byte offsets into the exact string on screen, which must be the
//! reference lyric text verbatim for alignment words to be found again.

use std::ops::Range;

/// Locates occurrences of a word in displayed text.
pub trait TextSearch {
    /// Byte offset of the first occurrence of `needle` at or after `from`.
    ///
    /// Case-sensitive substring match. Returns `None` when `from` is out of
    /// range or not on a character boundary.
    fn find_occurrence(&self, needle: &str, from: usize) -> Option<usize>;
}

impl TextSearch for str {
    fn find_occurrence(&self, needle: &str, from: usize) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        let haystack = self.get(from..)?;
        haystack.find(needle).map(|offset| from + offset)
    }
}

/// Lyrics as displayed, plus at most one highlighted span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricsDocument {
    text: String,
    highlight: Option<Range<usize>>,
}

impl LyricsDocument {
    /// Display `text` with nothing highlighted.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), highlight: None }
    }

    /// The displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The highlighted byte range, if any.
    pub fn highlight(&self) -> Option<Range<usize>> {
        self.highlight.clone()
    }

    /// Remove any highlight.
    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    /// Highlight `len` bytes from `start`, replacing any previous highlight.
    ///
    /// Spans that fall outside the text or split a character are ignored.
    pub fn highlight_span(&mut self, start: usize, len: usize) {
        let end = start.saturating_add(len);
        if self.text.get(start..end).is_some() {
            self.highlight = Some(start..end);
        }
    }

    /// Split the text around the highlight as `(before, highlighted, after)`.
    pub fn segments(&self) -> (&str, &str, &str) {
        match &self.highlight {
            Some(range) => (
                &self.text[..range.start],
                &self.text[range.clone()],
                &self.text[range.end..],
            ),
            None => (self.text.as_str(), "", ""),
        }
    }
}

impl TextSearch for LyricsDocument {
    fn find_occurrence(&self, needle: &str, from: usize) -> Option<usize> {
        self.text.find_occurrence(needle, from)
    }
}
