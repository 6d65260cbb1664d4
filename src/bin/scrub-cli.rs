use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use scrub::intervals::DEFAULT_FLAG_PATTERN;
use scrub::logging::init_file_logging;
use scrub::opts::Opts;
use scrub::output_kind::OutputKind;
use scrub::scrub::Scrubber;

fn main() -> Result<()> {
    let params = Params::parse();

    if params.enable_logging {
        init_file_logging(".")?;
    }

    let scrubber = Scrubber::new(params.opts())?;
    scrubber.run(&params.source_path, &params.json_path, &params.output_path)?;

    tracing::info!("scrub completed");
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "scrub")]
#[command(about = "Replace flagged transcript words with a beep in audio or video")]
struct Params {
    /// Source audio or video file.
    #[arg(short = 's', long = "source")]
    source_path: PathBuf,

    /// Transcript JSON with a `word_segments` container.
    #[arg(short = 'j', long = "json")]
    json_path: PathBuf,

    /// Where to write the scrubbed file.
    #[arg(short = 'o', long = "output")]
    output_path: PathBuf,

    /// Tone asset to fill redacted ranges. Defaults to a generated 1 kHz beep.
    #[arg(short = 't', long = "tone")]
    tone_path: Option<PathBuf>,

    /// Write audio only, or re-mux the source video with the scrubbed audio.
    #[arg(short = 'k', long = "kind", value_enum, default_value_t = OutputKind::Audio)]
    output_kind: OutputKind,

    /// ffmpeg audio codec for the output.
    #[arg(long = "audio-codec")]
    audio_codec: Option<String>,

    /// ffmpeg video codec for video output (default: copy).
    #[arg(long = "video-codec")]
    video_codec: Option<String>,

    /// Regex marking a word for redaction.
    #[arg(long = "pattern", default_value = DEFAULT_FLAG_PATTERN)]
    pattern: String,

    /// ffmpeg executable.
    #[arg(long = "ffmpeg", default_value = "ffmpeg")]
    ffmpeg_path: PathBuf,

    /// Write a timestamped log file to the current directory.
    #[arg(short = 'l', long = "log", default_value_t = false)]
    enable_logging: bool,
}

impl Params {
    fn opts(&self) -> Opts {
        Opts {
            pattern: self.pattern.clone(),
            output_kind: self.output_kind,
            tone_path: self.tone_path.clone(),
            audio_codec: self.audio_codec.clone(),
            video_codec: self.video_codec.clone(),
            ffmpeg_path: self.ffmpeg_path.clone(),
        }
    }
}
