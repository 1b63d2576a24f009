//! Audio transport: load, play, pause and report position.
//!
//! [`ProcessTransport`] plays through an external player process and keeps
//! its own clock, so the reported position is monotonic while playing,
//! constant while paused and back at zero after a load.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Playback control consumed by the host.
pub trait AudioTransport {
    /// Prepare `path` for playback from the start. Stops anything playing.
    fn load(&mut self, path: &Path) -> Result<()>;
    /// Start or resume playback.
    fn play(&mut self) -> Result<()>;
    /// Pause playback, keeping the position.
    fn pause(&mut self) -> Result<()>;
    /// Current position in seconds.
    fn position_seconds(&mut self) -> f64;
    /// Whether audio is currently playing.
    fn is_playing(&mut self) -> bool;
}

/// Monotonic play/pause clock.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    offset: Duration,
    running_since: Option<Instant>,
}

impl PlaybackClock {
    /// Start counting from the current offset.
    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Stop counting, folding elapsed time into the offset.
    pub fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.offset += since.elapsed();
        }
    }

    /// Back to zero, stopped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Elapsed play time.
    pub fn elapsed(&self) -> Duration {
        self.offset + self.running_since.map_or(Duration::ZERO, |since| since.elapsed())
    }

    /// Whether the clock is counting.
    pub const fn is_running(&self) -> bool {
        self.running_since.is_some()
    }
}

/// Plays audio by spawning a player such as `ffplay`.
///
/// Pausing stops the process; resuming starts a new one seeked to the
/// paused position.
#[derive(Debug)]
pub struct ProcessTransport {
    program: String,
    path: Option<PathBuf>,
    child: Option<Child>,
    clock: PlaybackClock,
}

impl ProcessTransport {
    /// Use `program` as the player.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            path: None,
            child: None,
            clock: PlaybackClock::default(),
        }
    }

    fn stop_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!("Player already exited: {e}");
            }
            let _ = child.wait();
        }
    }

    /// Freeze the clock once the player exits on its own (end of track).
    fn reap(&mut self) {
        let exited = match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(Some(_)) | Err(_)) => true,
            Some(Ok(None)) | None => false,
        };
        if exited {
            self.child = None;
            self.clock.stop();
        }
    }
}

impl AudioTransport for ProcessTransport {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.stop_child();
        if !path.is_file() {
            return Err(Error::Transport(format!("audio file not found: {}", path.display())));
        }
        self.path = Some(path.to_path_buf());
        self.clock.reset();
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.reap();
        if self.child.is_some() {
            return Ok(());
        }
        let Some(path) = &self.path else {
            return Err(Error::Transport("nothing loaded".to_string()));
        };

        let seek = format!("{:.3}", self.clock.elapsed().as_secs_f64());
        let child = Command::new(&self.program)
            .args(["-nodisp", "-autoexit", "-loglevel", "quiet", "-ss", &seek])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Transport(format!("failed to start `{}`: {e}", self.program)))?;

        tracing::debug!("Playing {} from {seek}s", path.display());
        self.child = Some(child);
        self.clock.start();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.clock.stop();
        self.stop_child();
        Ok(())
    }

    fn position_seconds(&mut self) -> f64 {
        self.reap();
        self.clock.elapsed().as_secs_f64()
    }

    fn is_playing(&mut self) -> bool {
        self.reap();
        self.clock.is_running()
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        self.stop_child();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn clock_holds_still_while_stopped() {
        let mut clock = PlaybackClock::default();
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.start();
        std::thread::sleep(Duration::from_millis(20));
        clock.stop();
        let paused_at = clock.elapsed();
        assert!(paused_at >= Duration::from_millis(20));

        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(clock.elapsed(), paused_at);

        clock.reset();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        assert!(!clock.is_running());
    }

    #[test]
    fn load_rejects_missing_file() {
        let mut transport = ProcessTransport::new("ffplay");
        assert!(transport.load(Path::new("/nonexistent/song.mp3")).is_err());
        assert!(transport.play().is_err());
        assert_eq!(transport.position_seconds(), 0.0);
    }

    #[test]
    fn missing_player_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("song.mp3");
        std::fs::write(&song, b"").unwrap();

        let mut transport = ProcessTransport::new("lyricsync-no-such-player");
        transport.load(&song).unwrap();
        assert!(matches!(transport.play(), Err(Error::Transport(_))));
        assert!(!transport.is_playing());
    }
}
