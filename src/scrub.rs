//! High-level API for scrubbing flagged words out of media.
//!
//! We expose a single entry point (`Scrubber`) that wires together the lower-level pieces:
//! transcript → intervals → decode → splice → encode.
//!
//! The intent is:
//! - Callers choose behavior via `Opts` (pattern, output kind, tone, codecs).
//! - The flag pattern is compiled once and reused.
//! - Each `run` is an isolated batch job: every file handle and temporary file it opens is
//!   owned by the run and released on every exit path.
//! - Output is staged in a temporary file next to the destination and renamed into place
//!   only after it has been fully written, so a failed run never leaves a partial output.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use regex::Regex;
use tempfile::{Builder, NamedTempFile, TempPath};

use crate::audio_pipeline::conform;
use crate::decoder::decode_file;
use crate::encode::{audio_encode_args, run_ffmpeg, video_mux_args};
use crate::error::{Error, Result};
use crate::intervals::{RedactionInterval, extract, flag_pattern, normalize};
use crate::opts::Opts;
use crate::output_kind::OutputKind;
use crate::splice::splice;
use crate::tone::beep;
use crate::track::Track;
use crate::transcript::{TranscriptEntry, load_transcript};
use crate::wav::{write_wav, write_wav_to};

/// The main scrub entry point.
pub struct Scrubber {
    opts: Opts,
    pattern: Regex,
}

impl Scrubber {
    /// Create a scrubber, compiling the flag pattern up front.
    ///
    /// An invalid pattern is logged at error level and returned.
    pub fn new(opts: Opts) -> Result<Self> {
        let pattern = flag_pattern(&opts.pattern).inspect_err(|err| {
            tracing::error!(error = %err, pattern = %opts.pattern, "invalid flag pattern");
        })?;
        Ok(Self { opts, pattern })
    }

    /// Turn transcript entries into sorted, non-overlapping redaction intervals.
    pub fn intervals(&self, entries: &[TranscriptEntry]) -> Vec<RedactionInterval> {
        normalize(extract(entries, &self.pattern))
    }

    /// Load a transcript file and return its redaction intervals.
    pub fn intervals_from_file(
        &self,
        transcript: impl AsRef<Path>,
    ) -> Result<Vec<RedactionInterval>> {
        let entries = load_transcript(transcript)?;
        let intervals = self.intervals(&entries);

        tracing::info!(
            entries = entries.len(),
            intervals = intervals.len(),
            "extracted redaction intervals"
        );
        if let Ok(json) = serde_json::to_string(&intervals) {
            tracing::debug!(intervals = %json, "interval list");
        }

        Ok(intervals)
    }

    /// Load the configured tone in `source`'s format, or synthesize the default beep.
    pub fn tone_for(&self, source: &Track) -> Result<Track> {
        let tone = match &self.opts.tone_path {
            Some(path) => {
                let clip = decode_file(path)?;
                conform(clip, source.sample_rate(), source.channels())?
            }
            None => beep(source.sample_rate(), source.channels())?,
        };
        Ok(tone)
    }

    /// Replace `intervals` in `source` with the configured tone.
    pub fn scrub_track(&self, source: &Track, intervals: &[RedactionInterval]) -> Result<Track> {
        let tone = self.tone_for(source)?;
        splice(source, &tone, intervals)
    }

    /// Scrub `source` media using the flagged words in `transcript`, writing `output`.
    ///
    /// Failures are logged at error level and returned; `output` is left untouched.
    pub fn run(
        &self,
        source: impl AsRef<Path>,
        transcript: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<()> {
        let (source, transcript, output) = (source.as_ref(), transcript.as_ref(), output.as_ref());

        let res = self.run_inner(source, transcript, output);
        if let Err(err) = &res {
            tracing::error!(
                error = %err,
                source = %source.display(),
                output = %output.display(),
                "scrub failed"
            );
        }
        res
    }

    fn run_inner(&self, source: &Path, transcript: &Path, output: &Path) -> Result<()> {
        let intervals = self.intervals_from_file(transcript)?;

        let audio = decode_file(source)?;
        let scrubbed = self.scrub_track(&audio, &intervals)?;
        drop(audio);

        self.write_output(&scrubbed, source, output)?;
        tracing::info!(path = %output.display(), "saved scrubbed output");
        Ok(())
    }

    fn write_output(&self, track: &Track, source: &Path, output: &Path) -> Result<()> {
        let staged = staging_file(output)?;

        match self.opts.output_kind {
            OutputKind::Audio if is_wav(output) => {
                let mut file = staged.reopen()?;
                write_wav_to(track, BufWriter::new(&mut file))?;
            }
            OutputKind::Audio => {
                let wav = intermediate_wav(track)?;
                let args =
                    audio_encode_args(&wav, staged.path(), self.opts.audio_codec.as_deref());
                run_ffmpeg(&self.opts.ffmpeg_path, &args)?;
            }
            OutputKind::Video => {
                let wav = intermediate_wav(track)?;
                let args = video_mux_args(
                    source,
                    &wav,
                    staged.path(),
                    self.opts.video_codec.as_deref(),
                    self.opts.audio_codec.as_deref(),
                );
                run_ffmpeg(&self.opts.ffmpeg_path, &args)?;
            }
        }

        staged
            .persist(output)
            .map_err(|e| Error::media(format!("failed to move output into place: {e}")))?;
        Ok(())
    }
}

/// Create an empty temp file beside `output` with the same extension.
///
/// ffmpeg picks the container from the extension, and a sibling path keeps the final rename
/// on one filesystem.
fn staging_file(output: &Path) -> Result<NamedTempFile> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let suffix = output
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    Builder::new()
        .prefix(".scrub-")
        .suffix(&suffix)
        .tempfile_in(&dir)
        .map_err(|e| Error::media(format!("cannot stage output in '{}': {e}", dir.display())))
}

/// Write `track` to a temporary WAV that is deleted when the returned path drops.
fn intermediate_wav(track: &Track) -> Result<TempPath> {
    let path = Builder::new()
        .prefix("scrub-")
        .suffix(".wav")
        .tempfile()?
        .into_temp_path();
    write_wav(track, &path)?;
    tracing::debug!(path = %path.display(), "wrote intermediate audio");
    Ok(path)
}

fn is_wav(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}
