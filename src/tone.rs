//! Built-in beep used when no tone asset is supplied.

use std::f64::consts::TAU;

use anyhow::Result;

use crate::track::Track;

/// Beep pitch (Hz).
pub const BEEP_FREQUENCY_HZ: f64 = 1_000.0;

/// Peak amplitude of the generated beep.
pub const BEEP_AMPLITUDE: f32 = 0.5;

/// Length of one generated beep clip (seconds). Longer intervals loop it.
pub const BEEP_SECONDS: f64 = 1.0;

/// Synthesize a sine beep in the given format, identical on every channel.
pub fn beep(sample_rate: u32, channels: usize) -> Result<Track> {
    let frames = (BEEP_SECONDS * sample_rate as f64).round() as usize;
    let mut samples = Vec::with_capacity(frames * channels);

    for n in 0..frames {
        let t = n as f64 / sample_rate as f64;
        let v = (TAU * BEEP_FREQUENCY_HZ * t).sin() as f32 * BEEP_AMPLITUDE;
        samples.extend(std::iter::repeat_n(v, channels));
    }

    Track::new(samples, sample_rate, channels)
}
