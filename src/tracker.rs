//! Playback highlight tracking.
//!
//! Decides on each tick which aligned word is current and where in the
//! displayed text to paint it. The decision itself is a pure function of
//! the alignment table, the previous [`HighlightState`] and the playback
//! position; [`HighlightTracker`] just owns the published table and state.

use std::ops::Range;
use std::sync::Arc;

use crate::constants::playback::RESUME_PROBE_LEN;
use crate::document::TextSearch;
use crate::types::AlignmentTable;

/// Where the tracker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No table published for the current song.
    Idle,
    /// Table published, nothing highlighted yet.
    Armed,
    /// A word is highlighted.
    Tracking,
}

/// The last word that was highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedWord {
    /// Index into the alignment table.
    pub entry_index: usize,
    /// Byte span of the occurrence that was painted.
    pub span: Range<usize>,
}

/// Highlight state owned by the foreground loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    /// `None` until a word has been highlighted since the last reset.
    pub last_matched: Option<MatchedWord>,
}

impl HighlightState {
    /// Index of the last highlighted table entry.
    pub fn last_matched_entry_index(&self) -> Option<usize> {
        self.last_matched.as_ref().map(|m| m.entry_index)
    }
}

/// Instruction for the render surface: clear the old highlight, paint this span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightInstruction {
    /// Index into the alignment table.
    pub entry_index: usize,
    /// Index of the word in the reference lyrics.
    pub original_index: usize,
    /// Byte offset of the occurrence in the displayed text.
    pub start: usize,
    /// Byte length of the occurrence.
    pub len: usize,
}

/// Compute the next highlight state for playback position `t` (seconds).
///
/// Returns the unchanged state and no instruction when no entry covers `t`,
/// when the covering entry is already highlighted, or when its text cannot
/// be found in `text`.
///
/// When moving forward the search resumes after the previously painted
/// occurrence so repeated words land on the right line. A backward move
/// (e.g. after a seek) searches from the top and may pick an earlier
/// occurrence of a repeated word.
pub fn advance<S>(
    table: &AlignmentTable,
    state: &HighlightState,
    t: f64,
    text: &S,
) -> (HighlightState, Option<HighlightInstruction>)
where
    S: TextSearch + ?Sized,
{
    let unchanged = || (state.clone(), None);

    let hint = state.last_matched_entry_index().unwrap_or(0);
    let Some(current) = table.first_containing_from(t, hint, RESUME_PROBE_LEN) else {
        return unchanged();
    };
    if state.last_matched_entry_index() == Some(current) {
        return unchanged();
    }
    let Some(entry) = table.get(current) else {
        return unchanged();
    };

    let search_from = match &state.last_matched {
        Some(prev) if prev.entry_index < current => prev.span.end,
        _ => 0,
    };

    let Some(start) = text.find_occurrence(&entry.text, search_from) else {
        tracing::debug!(
            "Word {:?} (entry {current}) not found in displayed text after offset {search_from}",
            entry.text
        );
        return unchanged();
    };

    let len = entry.text.len();
    let next = HighlightState {
        last_matched: Some(MatchedWord { entry_index: current, span: start..start + len }),
    };
    let instruction = HighlightInstruction {
        entry_index: current,
        original_index: entry.original_index,
        start,
        len,
    };
    (next, Some(instruction))
}

/// Owns the published alignment table and the highlight state.
#[derive(Debug, Default)]
pub struct HighlightTracker {
    table: Option<Arc<AlignmentTable>>,
    state: HighlightState,
}

impl HighlightTracker {
    /// A tracker with no table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `table` the active table and reset highlight state.
    pub fn publish(&mut self, table: Arc<AlignmentTable>) {
        self.table = Some(table);
        self.state = HighlightState::default();
    }

    /// Drop the table and reset highlight state (song change or invalidation).
    pub fn reset(&mut self) {
        self.table = None;
        self.state = HighlightState::default();
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> TrackerPhase {
        match (&self.table, &self.state.last_matched) {
            (None, _) => TrackerPhase::Idle,
            (Some(_), None) => TrackerPhase::Armed,
            (Some(_), Some(_)) => TrackerPhase::Tracking,
        }
    }

    /// The active table, if one is published.
    pub fn table(&self) -> Option<&Arc<AlignmentTable>> {
        self.table.as_ref()
    }

    /// Current highlight state.
    pub const fn state(&self) -> &HighlightState {
        &self.state
    }

    /// Index of the last highlighted table entry.
    pub fn last_matched_entry_index(&self) -> Option<usize> {
        self.state.last_matched_entry_index()
    }

    /// Run one tick at playback position `t`.
    pub fn on_tick<S>(&mut self, t: f64, text: &S) -> Option<HighlightInstruction>
    where
        S: TextSearch + ?Sized,
    {
        let table = self.table.as_ref()?;
        let (next, instruction) = advance(table, &self.state, t, text);
        self.state = next;
        instruction
    }
}
