//! In-process silence trimming for WAV files.
//!
//! Audio is cut into short frames; a run of frames quieter than the threshold
//! that lasts at least the minimum silence length is removed. Everything else
//! is concatenated into a new file, and the kept spans are returned as a
//! [`TimelineMap`] so timestamps can be mapped back.

use std::ops::Range;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::timeline::TimelineMap;
use super::{SilenceParams, SilenceTrimmer, TrimmedAudio};
use crate::constants::silence::FRAME_MS;
use crate::error::{Error, Result, Stage};

const OUTPUT_NAME: &str = "vocals_trimmed.wav";

/// Silence trimmer backed by `hound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavSilenceTrimmer;

#[async_trait]
impl SilenceTrimmer for WavSilenceTrimmer {
    async fn trim_silence(&self, audio: &Path, work_dir: &Path, params: SilenceParams) -> Result<TrimmedAudio> {
        let input = audio.to_path_buf();
        let output = work_dir.join(OUTPUT_NAME);
        tokio::task::spawn_blocking(move || trim_wav(&input, &output, params))
            .await
            .map_err(|e| Error::pipeline(Stage::SilenceTrimming, e))?
    }
}

enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Samples {
    fn read(reader: WavReader<std::io::BufReader<std::fs::File>>) -> hound::Result<(WavSpec, Self)> {
        let spec = reader.spec();
        let samples = match spec.sample_format {
            SampleFormat::Int => Self::Int(reader.into_samples::<i32>().collect::<hound::Result<_>>()?),
            SampleFormat::Float => Self::Float(reader.into_samples::<f32>().collect::<hound::Result<_>>()?),
        };
        Ok((spec, samples))
    }

    fn len(&self) -> usize {
        match self {
            Self::Int(s) => s.len(),
            Self::Float(s) => s.len(),
        }
    }

    /// Loudness of `range` in dBFS; `-inf` for digital silence.
    #[allow(clippy::cast_possible_truncation)]
    fn dbfs(&self, range: Range<usize>, bits_per_sample: u16) -> f32 {
        let (sum, count) = match self {
            Self::Int(s) => {
                let full_scale = f64::from(1u32 << (bits_per_sample.saturating_sub(1)).min(31));
                s[range].iter().fold((0.0, 0usize), |(sum, n), &v| {
                    let x = f64::from(v) / full_scale;
                    (sum + x * x, n + 1)
                })
            }
            Self::Float(s) => s[range].iter().fold((0.0, 0usize), |(sum, n), &v| {
                let x = f64::from(v);
                (sum + x * x, n + 1)
            }),
        };
        if count == 0 {
            return f32::NEG_INFINITY;
        }
        let rms = (sum / count as f64).sqrt();
        (20.0 * rms.log10()) as f32
    }

    fn write(&self, writer: &mut WavWriter<std::io::BufWriter<std::fs::File>>, range: Range<usize>) -> hound::Result<()> {
        match self {
            Self::Int(s) => s[range].iter().try_for_each(|&v| writer.write_sample(v)),
            Self::Float(s) => s[range].iter().try_for_each(|&v| writer.write_sample(v)),
        }
    }
}

/// Frame ranges that survive trimming.
///
/// A silent run is only removed when it is at least `min_run` frames long.
pub fn kept_frames(frame_db: &[f32], threshold_db: f32, min_run: usize) -> Vec<Range<usize>> {
    let mut kept = Vec::new();
    let mut keep_start = 0;
    let mut i = 0;
    while i < frame_db.len() {
        if frame_db[i] >= threshold_db {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < frame_db.len() && frame_db[i] < threshold_db {
            i += 1;
        }
        if i - run_start >= min_run.max(1) {
            if run_start > keep_start {
                kept.push(keep_start..run_start);
            }
            keep_start = i;
        }
    }
    if keep_start < frame_db.len() {
        kept.push(keep_start..frame_db.len());
    }
    kept
}

/// Interleaved sample range covered by a run of frames.
fn sample_range(frames: &Range<usize>, frame_len: usize, total: usize) -> Range<usize> {
    (frames.start * frame_len).min(total)..(frames.end * frame_len).min(total)
}

/// Start and end of an interleaved sample range in seconds.
///
/// Frames hold a whole number of samples, so a frame is only approximately
/// `FRAME_MS` long; times come from sample positions to avoid drift.
fn span_seconds(range: &Range<usize>, channels: usize, sample_rate: u32) -> (f64, f64) {
    let per_second = (channels * sample_rate.max(1) as usize) as f64;
    (range.start as f64 / per_second, range.end as f64 / per_second)
}

fn trim_wav(input: &Path, output: &Path, params: SilenceParams) -> Result<TrimmedAudio> {
    let fail = |e: hound::Error| Error::pipeline(Stage::SilenceTrimming, format!("{}: {e}", input.display()));

    let reader = WavReader::open(input).map_err(fail)?;
    let (spec, samples) = Samples::read(reader).map_err(fail)?;

    let channels = usize::from(spec.channels.max(1));
    let frame_len = (spec.sample_rate as usize * FRAME_MS as usize / 1000).max(1) * channels;
    let frame_count = samples.len().div_ceil(frame_len);

    let frame_db: Vec<f32> = (0..frame_count)
        .map(|f| {
            let start = f * frame_len;
            samples.dbfs(start..(start + frame_len).min(samples.len()), spec.bits_per_sample)
        })
        .collect();

    let min_run = (params.min_silence_ms / FRAME_MS) as usize;
    let kept = kept_frames(&frame_db, params.threshold_db, min_run);
    if kept.is_empty() {
        return Err(Error::pipeline(Stage::SilenceTrimming, "audio is entirely silent"));
    }

    let mut writer = WavWriter::create(output, spec).map_err(fail)?;
    let mut spans = Vec::with_capacity(kept.len());
    for frames in &kept {
        let range = sample_range(frames, frame_len, samples.len());
        spans.push(span_seconds(&range, channels, spec.sample_rate));
        samples.write(&mut writer, range).map_err(fail)?;
    }
    writer.finalize().map_err(fail)?;

    tracing::info!(
        "Trimmed silence from {}: kept {} of {} frames in {} spans",
        input.display(),
        kept.iter().map(ExactSizeIterator::len).sum::<usize>(),
        frame_count,
        kept.len()
    );

    Ok(TrimmedAudio {
        path: PathBuf::from(output),
        timeline: TimelineMap::from_kept_spans(&spans),
    })
}
