//! Application constants.
//!
//! Centralizes magic numbers and configuration values for better maintainability.

/// Alignment policy defaults.
pub mod alignment {
    /// Transcribed words searched on each side of a reference word's index.
    pub const DEFAULT_WINDOW_RADIUS: usize = 15;

    /// A candidate must score strictly above this to be accepted.
    pub const DEFAULT_MATCH_THRESHOLD: u8 = 70;

    /// Characters stripped from the end of transcribed words before scoring.
    pub const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?'];
}

/// Playback tracking constants.
pub mod playback {
    /// Default interval between highlight ticks, in milliseconds.
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

    /// Entries probed forward from the last highlighted entry before a full scan.
    pub const RESUME_PROBE_LEN: usize = 8;
}

/// Silence trimming defaults.
pub mod silence {
    /// Minimum length of a quiet stretch to count as silence.
    pub const DEFAULT_MIN_SILENCE_MS: u32 = 1000;

    /// Loudness below which audio counts as silent, in dBFS.
    pub const DEFAULT_THRESHOLD_DB: f32 = -40.0;

    /// Analysis frame length in milliseconds.
    pub const FRAME_MS: u32 = 10;
}

/// External tool defaults.
pub mod tools {
    /// Vocal isolation executable.
    pub const DEFAULT_DEMUCS_BIN: &str = "demucs";

    /// Demucs model name; also the name of its output subdirectory.
    pub const DEFAULT_DEMUCS_MODEL: &str = "htdemucs";

    /// Transcription executable.
    pub const DEFAULT_WHISPER_BIN: &str = "whisper";

    /// Whisper model size.
    pub const DEFAULT_WHISPER_MODEL: &str = "base";

    /// Audio player used by the process transport.
    pub const DEFAULT_PLAYER_BIN: &str = "ffplay";
}

/// Song library constants.
pub mod library {
    /// Default directory scanned for songs.
    pub const DEFAULT_SONGS_DIR: &str = "data";

    /// Audio extensions recognised as songs.
    pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav"];

    /// Minimum fuzzy score for a song to survive search filtering.
    pub const MIN_SEARCH_SCORE: i64 = 10;
}

/// Async task constants.
pub mod async_tasks {
    /// Channel buffer size for async task communication.
    pub const CHANNEL_BUFFER_SIZE: usize = 10;
}

/// UI layout constants.
pub mod ui {
    /// Width of the song list pane, in percent.
    pub const SONG_PANE_PERCENT: u16 = 30;

    /// Maximum displayed width of a song title.
    pub const MAX_TITLE_WIDTH: usize = 32;
}
