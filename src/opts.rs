use std::path::PathBuf;

use crate::intervals::DEFAULT_FLAG_PATTERN;
use crate::output_kind::OutputKind;

/// Options that control how a scrub run is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - tests and batch jobs can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Regex that marks a transcript word for redaction.
    ///
    /// Matched as a substring of each word, case-sensitively.
    pub pattern: String,

    /// Audio-only output or video re-mux.
    pub output_kind: OutputKind,

    /// Filler audio for redacted ranges.
    ///
    /// When `None`, a 1 kHz beep is synthesized in the source's format.
    pub tone_path: Option<PathBuf>,

    /// ffmpeg audio codec (`-c:a`).
    ///
    /// When `None`: ffmpeg's default for the output extension in audio mode, `aac` in video mode.
    /// Ignored for `.wav` audio output, which is written directly.
    pub audio_codec: Option<String>,

    /// ffmpeg video codec (`-c:v`) for video mode. `None` copies the source stream.
    pub video_codec: Option<String>,

    /// ffmpeg executable to run.
    pub ffmpeg_path: PathBuf,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_FLAG_PATTERN.to_string(),
            output_kind: OutputKind::Audio,
            tone_path: None,
            audio_codec: None,
            video_codec: None,
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}
