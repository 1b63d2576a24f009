//! Per-song session state and the foreground side of the sync handoff.
//!
//! The host drives a [`Session`]: it loads songs, triggers synchronization and
//! calls [`Session::on_tick`] at a steady cadence. Finished jobs are picked up
//! at the start of a tick; results for a song that is no longer loaded are
//! thrown away.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;

use crate::alignment::{AlignmentBuilder, AlignmentConfig};
use crate::constants::async_tasks::CHANNEL_BUFFER_SIZE;
use crate::document::LyricsDocument;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::sync::{SyncResult, SyncTicket, SyncUpdate, SyncWorker};
use crate::tracker::{HighlightInstruction, HighlightTracker, TrackerPhase};
use crate::types::{AlignmentTable, Song};

/// Answer to a sync trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    /// A job was started.
    Started,
    /// A job for this song is still running; the trigger was ignored.
    AlreadyRunning,
    /// No song is loaded.
    NoSong,
}

/// Sync outcome to show the user, reported once per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotice {
    /// A table was published.
    Completed {
        /// Entries in the table.
        aligned: usize,
        /// Words in the reference lyrics.
        reference_words: usize,
    },
    /// The job failed; no table is active.
    Failed(String),
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Highlight applied to the document this tick.
    pub highlight: Option<HighlightInstruction>,
    /// Sync result observed this tick.
    pub notice: Option<SyncNotice>,
}

const JOB_ABORTED: &str = "synchronization job aborted unexpectedly";

struct InFlight {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Core state for the currently loaded song.
pub struct Session {
    worker: SyncWorker,
    updates: mpsc::Receiver<SyncUpdate>,
    song: Option<Song>,
    generation: u64,
    document: LyricsDocument,
    tracker: HighlightTracker,
    in_flight: Option<InFlight>,
}

impl Session {
    /// Create a session with no song loaded.
    pub fn new(pipeline: Pipeline, alignment: AlignmentConfig) -> Self {
        let (tx, updates) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            worker: SyncWorker::new(pipeline, AlignmentBuilder::new(alignment), tx),
            updates,
            song: None,
            generation: 0,
            document: LyricsDocument::default(),
            tracker: HighlightTracker::new(),
            in_flight: None,
        }
    }

    /// Forget everything about the current song.
    ///
    /// Cancels any running job, drops the table and clears the highlight.
    pub fn on_song_changed(&mut self) {
        self.generation += 1;
        if let Some(job) = self.in_flight.take() {
            job.handle.abort();
            tracing::debug!("Cancelled sync job from generation {}", job.generation);
        }
        self.tracker.reset();
        self.song = None;
        self.document = LyricsDocument::default();
    }

    /// Switch to `song` and display its lyrics.
    pub fn load_song(&mut self, song: Song) -> Result<()> {
        self.on_song_changed();
        let text = fs_err::read_to_string(&song.lyrics_path)
            .map_err(|e| Error::io(e, song.lyrics_path.clone()))?;
        tracing::info!("Loaded {} ({} lyric words)", song.id, text.split_whitespace().count());
        self.document = LyricsDocument::new(text);
        self.song = Some(song);
        Ok(())
    }

    /// Start synchronizing the loaded song in the background.
    pub fn trigger_sync(&mut self) -> SyncRequest {
        let Some(song) = &self.song else {
            return SyncRequest::NoSong;
        };
        if self.is_syncing() {
            return SyncRequest::AlreadyRunning;
        }

        let ticket = SyncTicket { song: song.id.clone(), generation: self.generation };
        let handle = self
            .worker
            .spawn(ticket, song.music_path.clone(), song.lyrics_path.clone());
        self.in_flight = Some(InFlight { generation: self.generation, handle });
        SyncRequest::Started
    }

    /// Run one tick at playback position `position` (seconds).
    ///
    /// Picks up finished jobs first, then moves the highlight if needed.
    pub fn on_tick(&mut self, position: f64) -> TickOutcome {
        let notice = self.drain_updates();
        let highlight = self.tracker.on_tick(position, &self.document);
        if let Some(instruction) = &highlight {
            self.document.clear_highlight();
            self.document.highlight_span(instruction.start, instruction.len);
        }
        TickOutcome { highlight, notice }
    }

    fn drain_updates(&mut self) -> Option<SyncNotice> {
        // Checked before draining: anything a finished job sent is already queued
        let finished = self.in_flight.as_ref().is_some_and(|job| job.handle.is_finished());
        let mut notice = None;
        loop {
            match self.updates.try_recv() {
                Ok(update) => {
                    if let Some(n) = self.apply_update(update) {
                        notice = Some(n);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        // Still in flight after draining: the job ended without reporting
        if finished {
            if let Some(job) = self.in_flight.take() {
                tracing::warn!("Sync job from generation {} ended without a result", job.generation);
                self.tracker.reset();
                self.document.clear_highlight();
                notice = Some(SyncNotice::Failed(JOB_ABORTED.to_string()));
            }
        }
        notice
    }

    fn apply_update(&mut self, update: SyncUpdate) -> Option<SyncNotice> {
        let SyncUpdate { ticket, outcome } = update;
        let current = self.song.as_ref().map(|s| &s.id);
        if ticket.generation != self.generation || current != Some(&ticket.song) {
            tracing::debug!(
                "Discarding stale sync result for {} (generation {}, now {})",
                ticket.song,
                ticket.generation,
                self.generation
            );
            return None;
        }
        self.in_flight = None;

        match outcome {
            Ok(SyncResult { table, reference_words }) => {
                let aligned = table.len();
                self.publish(table);
                Some(SyncNotice::Completed { aligned, reference_words })
            }
            Err(e) => {
                self.tracker.reset();
                self.document.clear_highlight();
                Some(SyncNotice::Failed(e.to_string()))
            }
        }
    }

    fn publish(&mut self, table: Arc<AlignmentTable>) {
        self.tracker.publish(table);
        self.document.clear_highlight();
    }

    /// The loaded song.
    pub const fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    /// The displayed lyrics and highlight.
    pub const fn document(&self) -> &LyricsDocument {
        &self.document
    }

    /// Highlight tracker state.
    pub const fn tracker(&self) -> &HighlightTracker {
        &self.tracker
    }

    /// Tracker lifecycle phase.
    pub fn phase(&self) -> TrackerPhase {
        self.tracker.phase()
    }

    /// Whether a job for the current song is running.
    pub const fn is_syncing(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(job) = self.in_flight.take() {
            job.handle.abort();
        }
    }
}
