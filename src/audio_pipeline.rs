//! PCM normalization for Scrub.
//!
//! Responsibilities:
//! - Convert Symphonia-decoded PCM into interleaved `f32`
//! - Remap channel layouts (downmix / duplicate)
//! - Resample between rates with rubato
//!
//! The source track is never touched by this module; only the tone clip is conformed to the
//! source's format so the two can be spliced frame for frame.

use anyhow::{Context, Result, anyhow, bail};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, WindowFunction};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer, SignalSpec};

use crate::track::Track;

/// Source frames fed to rubato per `process()` call.
const RESAMPLE_CHUNK_FRAMES: usize = 2048;

/// Copy a decoded Symphonia buffer onto the end of `out` as interleaved `f32`.
///
/// `scratch` is reused across calls and regrown when a packet decodes to more frames than
/// it can hold. Returns the signal spec of the decoded buffer.
pub fn append_interleaved_f32(
    decoded: &AudioBufferRef<'_>,
    scratch: &mut Option<SampleBuffer<f32>>,
    out: &mut Vec<f32>,
) -> Result<SignalSpec> {
    let spec = *decoded.spec();
    let channels = spec.channels.count();
    if channels == 0 {
        bail!("decoded audio had zero channels");
    }

    // `SampleBuffer::capacity` counts samples across all channels.
    let frames = decoded.capacity();
    let too_small = scratch
        .as_ref()
        .is_none_or(|buf| buf.capacity() < frames * channels);
    if too_small {
        *scratch = Some(SampleBuffer::<f32>::new(frames as u64, spec));
    }

    let buf = scratch
        .as_mut()
        .ok_or_else(|| anyhow!("sample buffer not initialized"))?;

    buf.copy_interleaved_ref(decoded.clone());
    out.extend_from_slice(buf.samples());

    Ok(spec)
}

/// Return `track` in the requested sample rate and channel count.
pub fn conform(track: Track, sample_rate: u32, channels: usize) -> Result<Track> {
    if track.sample_rate() == sample_rate && track.channels() == channels {
        return Ok(track);
    }

    tracing::debug!(
        from_rate = track.sample_rate(),
        from_channels = track.channels(),
        to_rate = sample_rate,
        to_channels = channels,
        "conforming audio format"
    );

    let src_rate = track.sample_rate();
    let remapped = remap_channels(track.samples(), track.channels(), channels);

    let samples = if src_rate == sample_rate {
        remapped
    } else {
        resample_interleaved(&remapped, channels, src_rate, sample_rate)?
    };

    Track::new(samples, sample_rate, channels)
}

/// Convert interleaved samples between channel counts.
///
/// Policy:
/// - same count → unchanged
/// - mono target → equal-weight average of all channels
/// - otherwise → downmix to mono, then copy to every target channel
fn remap_channels(interleaved: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to {
        return interleaved.to_vec();
    }

    let mono = downmix_to_mono(interleaved, from);
    if to == 1 {
        return mono;
    }

    let mut out = Vec::with_capacity(mono.len() * to);
    for s in mono {
        out.extend(std::iter::repeat_n(s, to));
    }
    out
}

/// Downmix interleaved samples into mono by averaging channels.
fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }

    let frames = interleaved.len() / channels;
    let mut mono = Vec::with_capacity(frames);

    for f in 0..frames {
        let base = f * channels;
        let mut acc = 0.0;
        for c in 0..channels {
            acc += interleaved[base + c];
        }
        mono.push(acc / channels as f32);
    }

    mono
}

/// Resample interleaved audio from `src_rate` to `dst_rate`.
///
/// The output is delay-compensated and trimmed to `round(frames * ratio)` frames.
fn resample_interleaved(
    interleaved: &[f32],
    channels: usize,
    src_rate: u32,
    dst_rate: u32,
) -> Result<Vec<f32>> {
    let frames = interleaved.len() / channels;
    let ratio = dst_rate as f64 / src_rate as f64;
    let expected = (frames as f64 * ratio).round() as usize;

    if frames == 0 {
        return Ok(Vec::new());
    }

    let mut rs = SincFixedIn::<f32>::new(
        ratio,
        1.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: rubato::SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        RESAMPLE_CHUNK_FRAMES,
        channels,
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let planar = deinterleave(interleaved, channels);
    let delay = rs.output_delay();
    let mut out: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut pos = 0;
    while frames - pos >= rs.input_frames_next() {
        let n = rs.input_frames_next();
        let block: Vec<&[f32]> = planar.iter().map(|c| &c[pos..pos + n]).collect();
        let res = rs
            .process(block.as_slice(), None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        append_planar(&mut out, res);
        pos += n;
    }

    if pos < frames {
        let block: Vec<&[f32]> = planar.iter().map(|c| &c[pos..]).collect();
        let res = rs
            .process_partial(Some(block.as_slice()), None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        append_planar(&mut out, res);
    }

    // Drain the resampler's internal delay line.
    while out[0].len() < delay + expected {
        let res = rs
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| anyhow!(e))
            .context("resampler flush failed")?;
        if res.first().is_none_or(|c| c.is_empty()) {
            break;
        }
        append_planar(&mut out, res);
    }

    for chan in &mut out {
        chan.drain(..delay.min(chan.len()));
        chan.resize(expected, 0.0);
    }

    Ok(interleave(&out))
}

fn append_planar(out: &mut [Vec<f32>], res: Vec<Vec<f32>>) {
    for (dst, src) in out.iter_mut().zip(res) {
        dst.extend_from_slice(&src);
    }
}

fn deinterleave(interleaved: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let mut planar = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (c, s) in frame.iter().enumerate() {
            planar[c].push(*s);
        }
    }
    planar
}

fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(frames * planar.len());
    for f in 0..frames {
        for chan in planar {
            out.push(chan[f]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_to_mono_single_channel_is_identity() {
        let input = vec![0.0, 1.0, -1.0];
        let mono = downmix_to_mono(&input, 1);
        assert_eq!(mono, input);
    }

    #[test]
    fn downmix_to_mono_averages_channels() {
        // Two frames of stereo: (L=1, R=3), (L=-1, R=1) => mono: 2, 0
        let interleaved = vec![1.0, 3.0, -1.0, 1.0];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![2.0, 0.0]);
    }

    #[test]
    fn remap_mono_to_stereo_duplicates() {
        assert_eq!(remap_channels(&[0.5, -0.5], 1, 2), vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn interleave_round_trips_planar_layout() {
        let interleaved = vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        let planar = deinterleave(&interleaved, 2);
        assert_eq!(planar, vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]]);
        assert_eq!(interleave(&planar), interleaved);
    }

    #[test]
    fn conform_is_noop_for_matching_format() -> anyhow::Result<()> {
        let t = Track::new(vec![0.25; 8], 22_050, 2)?;
        assert_eq!(conform(t.clone(), 22_050, 2)?, t);
        Ok(())
    }

    #[test]
    fn conform_resamples_to_expected_length() -> anyhow::Result<()> {
        // 0.5s of a constant signal at 8 kHz → 16 kHz stereo.
        let t = Track::new(vec![0.5; 4_000], 8_000, 1)?;
        let out = conform(t, 16_000, 2)?;

        assert_eq!(out.sample_rate(), 16_000);
        assert_eq!(out.channels(), 2);
        assert_eq!(out.frames(), 8_000);

        // Away from the edges a DC signal stays close to its level.
        let mid = &out.samples()[4_000..12_000];
        assert!(mid.iter().all(|s| (s - 0.5).abs() < 0.05));
        Ok(())
    }

    #[test]
    fn conform_downsamples_short_clip() -> anyhow::Result<()> {
        let t = Track::new(vec![0.0; 441], 44_100, 1)?;
        let out = conform(t, 16_000, 1)?;
        assert_eq!(out.frames(), 160);
        Ok(())
    }
}
