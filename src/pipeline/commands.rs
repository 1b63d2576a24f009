//! Pipeline stages backed by external command-line tools.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::transcript::RawTranscription;
use super::{Transcriber, VocalIsolator};
use crate::error::{Error, Result, Stage};

/// Lines of stderr kept in failure messages.
const STDERR_TAIL_LINES: usize = 5;

/// Run `program` to completion, failing on spawn errors or a non-zero exit.
async fn run_tool<I, S>(stage: Stage, program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    tracing::debug!("Running {program} for {stage}");
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::pipeline(stage, format!("`{program}` not found; install it or set its *_BIN variable"))
            }
            _ => Error::pipeline(stage, format!("failed to start `{program}`: {e}")),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
    Err(Error::pipeline(stage, format!("`{program}` exited with {}: {tail}", output.status)))
}

fn file_stem(path: &Path, stage: Stage) -> Result<String> {
    path.file_stem()
        .and_then(OsStr::to_str)
        .map(str::to_string)
        .ok_or_else(|| Error::pipeline(stage, format!("no file name in {}", path.display())))
}

/// Vocal isolation through the `demucs` CLI.
#[derive(Debug, Clone)]
pub struct DemucsIsolator {
    program: String,
    model: String,
}

impl DemucsIsolator {
    /// Use `program` with the named model.
    pub fn new(program: impl Into<String>, model: impl Into<String>) -> Self {
        Self { program: program.into(), model: model.into() }
    }

    /// Where demucs writes the vocals stem for `audio`.
    pub fn output_path(&self, audio: &Path, work_dir: &Path) -> Result<PathBuf> {
        let stem = file_stem(audio, Stage::VocalIsolation)?;
        Ok(work_dir.join(&self.model).join(stem).join("vocals.wav"))
    }
}

#[async_trait]
impl VocalIsolator for DemucsIsolator {
    async fn isolate_vocals(&self, audio: &Path, work_dir: &Path) -> Result<PathBuf> {
        let output = self.output_path(audio, work_dir)?;
        run_tool(
            Stage::VocalIsolation,
            &self.program,
            [
                OsStr::new("--two-stems=vocals"),
                OsStr::new("-n"),
                OsStr::new(&self.model),
                OsStr::new("-o"),
                work_dir.as_os_str(),
                audio.as_os_str(),
            ],
        )
        .await?;

        if !output.is_file() {
            return Err(Error::pipeline(
                Stage::VocalIsolation,
                format!("expected vocals at {}", output.display()),
            ));
        }
        Ok(output)
    }
}

/// Transcription through the `whisper` CLI with word timestamps.
#[derive(Debug, Clone)]
pub struct WhisperCliTranscriber {
    program: String,
    model: String,
}

impl WhisperCliTranscriber {
    /// Use `program` with the named model.
    pub fn new(program: impl Into<String>, model: impl Into<String>) -> Self {
        Self { program: program.into(), model: model.into() }
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio: &Path, work_dir: &Path) -> Result<RawTranscription> {
        run_tool(
            Stage::Transcription,
            &self.program,
            [
                audio.as_os_str(),
                OsStr::new("--model"),
                OsStr::new(&self.model),
                OsStr::new("--word_timestamps"),
                OsStr::new("True"),
                OsStr::new("--output_format"),
                OsStr::new("json"),
                OsStr::new("--output_dir"),
                work_dir.as_os_str(),
            ],
        )
        .await?;

        let json_path = work_dir.join(format!("{}.json", file_stem(audio, Stage::Transcription)?));
        let json = fs_err::tokio::read_to_string(&json_path)
            .await
            .map_err(|e| Error::pipeline(Stage::Transcription, e))?;
        RawTranscription::from_json(&json, Some(&json_path))
    }
}
