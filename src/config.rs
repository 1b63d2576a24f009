//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::alignment::AlignmentConfig;
use crate::constants::{alignment, library, playback, silence, tools};
use crate::error::{Error, Result};

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    pub(crate) app_name: String,
    /// The application version
    pub(crate) app_version: String,
    /// Directory scanned for songs (audio + lyrics pairs)
    pub songs_dir: PathBuf,
    /// Alignment search window radius
    pub window_radius: usize,
    /// Alignment acceptance threshold (strictly greater)
    pub match_threshold: u8,
    /// Interval between highlight ticks in milliseconds
    pub tick_interval_ms: u64,
    /// Whether the pipeline trims silence before transcription
    pub trim_silence: bool,
    /// Minimum silence length for trimming
    pub min_silence_ms: u32,
    /// Silence threshold in dBFS
    pub silence_threshold_db: f32,
    /// Vocal isolation executable
    pub demucs_bin: String,
    /// Vocal isolation model
    pub demucs_model: String,
    /// Transcription executable
    pub whisper_bin: String,
    /// Transcription model
    pub whisper_model: String,
    /// Audio player executable
    pub player_bin: String,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Alignment policy derived from this configuration.
    pub const fn alignment(&self) -> AlignmentConfig {
        AlignmentConfig {
            window_radius: self.window_radius,
            match_threshold: self.match_threshold,
        }
    }

    /// Tick cadence as a `Duration`.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            songs_dir: PathBuf::from(library::DEFAULT_SONGS_DIR),
            window_radius: alignment::DEFAULT_WINDOW_RADIUS,
            match_threshold: alignment::DEFAULT_MATCH_THRESHOLD,
            tick_interval_ms: playback::DEFAULT_TICK_INTERVAL_MS,
            trim_silence: true,
            min_silence_ms: silence::DEFAULT_MIN_SILENCE_MS,
            silence_threshold_db: silence::DEFAULT_THRESHOLD_DB,
            demucs_bin: tools::DEFAULT_DEMUCS_BIN.to_string(),
            demucs_model: tools::DEFAULT_DEMUCS_MODEL.to_string(),
            whisper_bin: tools::DEFAULT_WHISPER_BIN.to_string(),
            whisper_model: tools::DEFAULT_WHISPER_MODEL.to_string(),
            player_bin: tools::DEFAULT_PLAYER_BIN.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable values keep their defaults; only values that parse but
    /// make no sense are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("SONGS_DIR") {
            config.songs_dir = PathBuf::from(shellexpand::tilde(&dir).to_string());
        }

        parse_into(&lookup, "ALIGN_WINDOW_RADIUS", &mut config.window_radius);
        parse_into(&lookup, "ALIGN_MATCH_THRESHOLD", &mut config.match_threshold);
        parse_into(&lookup, "TICK_INTERVAL_MS", &mut config.tick_interval_ms);
        parse_into(&lookup, "TRIM_SILENCE", &mut config.trim_silence);
        parse_into(&lookup, "MIN_SILENCE_MS", &mut config.min_silence_ms);
        parse_into(&lookup, "SILENCE_THRESHOLD_DB", &mut config.silence_threshold_db);

        if let Some(bin) = lookup("DEMUCS_BIN") {
            config.demucs_bin = bin;
        }
        if let Some(model) = lookup("DEMUCS_MODEL") {
            config.demucs_model = model;
        }
        if let Some(bin) = lookup("WHISPER_BIN") {
            config.whisper_bin = bin;
        }
        if let Some(model) = lookup("WHISPER_MODEL") {
            config.whisper_model = model;
        }
        if let Some(bin) = lookup("PLAYER_BIN") {
            config.player_bin = bin;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.match_threshold > 100 {
            return Err(Error::config(
                format!("ALIGN_MATCH_THRESHOLD is {}", self.match_threshold),
                "Similarity scores range from 0 to 100",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::config(
                "TICK_INTERVAL_MS is 0",
                "Use a positive interval such as 100",
            ));
        }
        Ok(())
    }
}

fn parse_into<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!("Ignoring unparseable {key}={raw:?}, keeping default"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_alignment_policy() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.window_radius, 15);
        assert_eq!(config.match_threshold, 70);
        assert_eq!(config.tick_interval_ms, 100);
        assert!(config.trim_silence);
        assert_eq!(config.app_name(), "lyricsync");
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("ALIGN_WINDOW_RADIUS", "5"),
            ("ALIGN_MATCH_THRESHOLD", "80"),
            ("TRIM_SILENCE", "false"),
            ("WHISPER_MODEL", "small"),
        ]))
        .unwrap();
        assert_eq!(config.alignment().window_radius, 5);
        assert_eq!(config.alignment().match_threshold, 80);
        assert!(!config.trim_silence);
        assert_eq!(config.whisper_model, "small");
    }

    #[test]
    fn garbage_values_keep_defaults() {
        let config = Config::from_lookup(lookup_from(&[("TICK_INTERVAL_MS", "soon")])).unwrap();
        assert_eq!(config.tick_interval_ms, 100);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("ALIGN_MATCH_THRESHOLD", "150")])).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
