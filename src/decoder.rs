// src/decoder.rs

//! Decode media (audio files or audio+video containers) into an in-memory [`Track`].
//!
//! The whole first audio track is decoded in one pass. The result keeps the source's
//! native sample rate and channel layout, so pass-through audio is carried over unchanged.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Track as StreamTrack};
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio_pipeline::append_interleaved_f32;
use crate::track::Track;

/// Decode the first audio track of a media file.
///
/// The file extension is passed to the prober as a hint.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Track> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let hint = path.extension().and_then(|e| e.to_str());

    let track = decode_source(Box::new(file), hint)
        .with_context(|| format!("failed to decode '{}'", path.display()))?;

    tracing::info!(
        path = %path.display(),
        sample_rate = track.sample_rate(),
        channels = track.channels(),
        seconds = track.duration(),
        "decoded audio"
    );
    Ok(track)
}

/// Decode the first audio track from any Symphonia `MediaSource`.
///
/// Undecodable packets are skipped with a warning. A read error ends the stream.
pub fn decode_source(source: Box<dyn MediaSource>, hint_extension: Option<&str>) -> Result<Track> {
    let (mut format, stream) = open_audio_stream(source, hint_extension)?;
    let mut decoder = decoder_for(&stream)?;

    let mut scratch: Option<SampleBuffer<f32>> = None;
    let mut samples = Vec::new();
    let mut spec: Option<SignalSpec> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("failed reading packet"),
        };

        // Video and other tracks share the container.
        if packet.track_id() != stream.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(SymphoniaError::DecodeError(err)) => {
                tracing::warn!(error = err, ts = packet.ts(), "skipping undecodable packet");
                continue;
            }
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("decoder failure"),
        };

        let got = append_interleaved_f32(&decoded, &mut scratch, &mut samples)?;
        match spec {
            None => spec = Some(got),
            Some(first) if first.rate != got.rate || first.channels != got.channels => {
                bail!(
                    "audio format changed mid-stream ({} Hz/{}ch → {} Hz/{}ch)",
                    first.rate,
                    first.channels.count(),
                    got.rate,
                    got.channels.count()
                );
            }
            Some(_) => {}
        }
    }

    // A stream with no decodable packets still has a format from its codec parameters.
    let (rate, channels) = match spec {
        Some(s) => (s.rate, s.channels.count()),
        None => {
            let rate = stream
                .codec_params
                .sample_rate
                .ok_or_else(|| anyhow!("audio track has no sample rate"))?;
            let channels = stream.codec_params.channels.map_or(1, |c| c.count());
            (rate, channels)
        }
    };

    Track::new(samples, rate, channels)
}

/// Probe the container and select its first audio stream.
///
/// Video and subtitle streams have no sample rate, so the first stream with a codec and a
/// sample rate is the audio. Gapless mode trims encoder delay and padding so the decoded
/// length matches the timeline transcript timestamps refer to.
fn open_audio_stream(
    source: Box<dyn MediaSource>,
    hint_extension: Option<&str>,
) -> Result<(Box<dyn FormatReader>, StreamTrack)> {
    let mss = MediaSourceStream::new(
        source,
        MediaSourceStreamOptions {
            buffer_len: 256 * 1024,
        },
    );

    let mut hint = Hint::new();
    if let Some(ext) = hint_extension {
        hint.with_extension(ext);
    }

    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &MetadataOptions::default())
        .map_err(|e| anyhow!(e))
        .context("unrecognized media container")?;

    let format = probed.format;
    let stream = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;

    tracing::debug!(
        track_id = stream.id,
        codec = ?stream.codec_params.codec,
        "selected audio stream"
    );
    Ok((format, stream))
}

fn decoder_for(stream: &StreamTrack) -> Result<Box<dyn Decoder>> {
    symphonia::default::get_codecs()
        .make(&stream.codec_params, &DecoderOptions::default())
        .map_err(|e| anyhow!(e))
        .context("unsupported audio codec")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::wav::encode_wav;

    #[test]
    fn decodes_wav_bytes_without_altering_samples() -> anyhow::Result<()> {
        let written = Track::new(vec![0.0, 0.25, -0.25, 0.5, -0.5, 1.0], 8_000, 2)?;
        let bytes = encode_wav(&written)?;

        let decoded = decode_source(Box::new(Cursor::new(bytes)), Some("wav"))?;
        assert_eq!(decoded, written);
        Ok(())
    }

    #[test]
    fn empty_input_fails_to_probe() {
        let err = decode_source(Box::new(Cursor::new(Vec::<u8>::new())), None).unwrap_err();
        assert!(format!("{err:#}").contains("unrecognized media container"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = decode_file("/no/such/input.mp3").unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/input.mp3"));
    }
}
