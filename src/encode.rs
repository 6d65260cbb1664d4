//! ffmpeg invocation for outputs we do not write ourselves.
//!
//! - compressed audio (mp3, m4a, ogg, ...) is encoded from an intermediate WAV
//! - video output maps the source's video stream next to the scrubbed audio
//!
//! Argument lists are built separately from running them so they can be checked in tests.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

/// Audio codec used for video output when none is configured.
pub const DEFAULT_VIDEO_AUDIO_CODEC: &str = "aac";

/// Video codec used when none is configured (stream copy, no re-encode).
pub const DEFAULT_VIDEO_CODEC: &str = "copy";

fn base_args() -> Vec<OsString> {
    ["-hide_banner", "-loglevel", "error", "-nostdin", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

/// Arguments to encode `input_wav` into `output`, whose extension selects the container.
pub fn audio_encode_args(
    input_wav: &Path,
    output: &Path,
    audio_codec: Option<&str>,
) -> Vec<OsString> {
    let mut args = base_args();
    args.push("-i".into());
    args.push(input_wav.into());
    args.push("-vn".into());

    if let Some(codec) = audio_codec {
        args.push("-c:a".into());
        args.push(codec.into());
    }

    args.push(output.into());
    args
}

/// Arguments to combine the first video stream of `source` with the audio in `audio_wav`.
pub fn video_mux_args(
    source: &Path,
    audio_wav: &Path,
    output: &Path,
    video_codec: Option<&str>,
    audio_codec: Option<&str>,
) -> Vec<OsString> {
    let mut args = base_args();
    args.push("-i".into());
    args.push(source.into());
    args.push("-i".into());
    args.push(audio_wav.into());

    for a in ["-map", "0:v:0", "-map", "1:a:0"] {
        args.push(a.into());
    }

    args.push("-c:v".into());
    args.push(video_codec.unwrap_or(DEFAULT_VIDEO_CODEC).into());
    args.push("-c:a".into());
    args.push(audio_codec.unwrap_or(DEFAULT_VIDEO_AUDIO_CODEC).into());

    args.push(output.into());
    args
}

/// Run ffmpeg with the given arguments. Fails on launch error or non-zero exit.
pub fn run_ffmpeg(ffmpeg: &Path, args: &[OsString]) -> Result<()> {
    tracing::debug!(
        ffmpeg = %ffmpeg.display(),
        args = ?args,
        "running ffmpeg"
    );

    let output = Command::new(ffmpeg)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to launch '{}'", ffmpeg.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "ffmpeg exited with status {}: {}",
            output.status.code().unwrap_or(-1),
            stderr_tail(&stderr)
        );
    }

    Ok(())
}

/// Last few non-empty lines of ffmpeg's stderr, which carry the actual error.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join(" | ")
}
