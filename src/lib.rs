//! `lyricsync` - word-level lyric highlighting synchronized to audio.
//!
//! This crate aligns a plain-text lyric transcript with a recording using
//! timestamped speech recognition, then tracks playback to highlight the
//! current word as the song plays.

// Re-export public modules for use in integration tests and as a library
pub mod alignment;
pub mod app;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod input;
pub mod library;
pub mod pipeline;
pub mod session;
pub mod sync;
pub mod tracker;
pub mod transport;
pub mod types;
pub mod ui;
