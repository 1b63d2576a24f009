//! Background synchronization jobs.
//!
//! A job reads the reference lyrics, runs the preprocessing pipeline, builds
//! the alignment table and sends exactly one [`SyncUpdate`] back over the
//! channel. It never touches highlight state; the foreground loop decides
//! whether the result still applies.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::alignment::AlignmentBuilder;
use crate::error::{Error, Result, Stage};
use crate::pipeline::Pipeline;
use crate::types::{tokenize_reference, AlignmentTable, SongId};

/// Identifies which song load a job was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTicket {
    /// Song the job belongs to.
    pub song: SongId,
    /// Session generation at the time of the trigger.
    pub generation: u64,
}

/// A finished alignment.
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// The immutable table to publish.
    pub table: Arc<AlignmentTable>,
    /// Number of reference words the table was built from.
    pub reference_words: usize,
}

/// Message from a job to the foreground loop.
#[derive(Debug)]
pub struct SyncUpdate {
    /// Which job this is.
    pub ticket: SyncTicket,
    /// Table or failure.
    pub outcome: Result<SyncResult>,
}

/// Spawns synchronization jobs on the tokio runtime.
#[derive(Debug, Clone)]
pub struct SyncWorker {
    pipeline: Pipeline,
    builder: AlignmentBuilder,
    tx: mpsc::Sender<SyncUpdate>,
}

impl SyncWorker {
    /// Create a worker that reports on `tx`.
    pub const fn new(pipeline: Pipeline, builder: AlignmentBuilder, tx: mpsc::Sender<SyncUpdate>) -> Self {
        Self { pipeline, builder, tx }
    }

    /// Start a job in the background. Must be called within a tokio runtime.
    pub fn spawn(&self, ticket: SyncTicket, music: PathBuf, lyrics: PathBuf) -> JoinHandle<()> {
        let pipeline = self.pipeline.clone();
        let builder = self.builder.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tracing::info!("Synchronizing {} (generation {})", ticket.song, ticket.generation);
            let started = Instant::now();
            let outcome = synchronize(&pipeline, &builder, &music, &lyrics).await;
            match &outcome {
                Ok(result) => tracing::info!(
                    "Synchronized {}: {} of {} words aligned in {:?}",
                    ticket.song,
                    result.table.len(),
                    result.reference_words,
                    started.elapsed()
                ),
                Err(e) => tracing::warn!("Synchronizing {} failed: {e}", ticket.song),
            }
            if tx.send(SyncUpdate { ticket, outcome }).await.is_err() {
                tracing::debug!("Session dropped before sync result could be delivered");
            }
        })
    }
}

/// Run one job to completion: lyrics, pipeline, alignment.
pub async fn synchronize(
    pipeline: &Pipeline,
    builder: &AlignmentBuilder,
    music: &Path,
    lyrics: &Path,
) -> Result<SyncResult> {
    let text = fs_err::tokio::read_to_string(lyrics)
        .await
        .map_err(|e| Error::pipeline(Stage::ReadLyrics, e))?;
    let reference = tokenize_reference(&text);

    let words = pipeline.transcribe_words(music).await?;

    let builder = builder.clone();
    let reference_words = reference.len();
    let table = tokio::task::spawn_blocking(move || builder.build(&reference, &words))
        .await
        .map_err(|e| Error::pipeline(Stage::Alignment, e))?;

    Ok(SyncResult { table: Arc::new(table), reference_words })
}
