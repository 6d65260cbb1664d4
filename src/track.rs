//! In-memory PCM track.
//!
//! A `Track` holds interleaved `f32` samples plus the format needed to interpret them.
//! All time-based operations are resolved to whole frames so that slicing and
//! concatenation never gain or lose samples.

use anyhow::{Result, bail, ensure};

/// A continuous, interleaved `f32` audio signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl Track {
    /// Wrap interleaved samples. `samples.len()` must be a multiple of `channels`.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Result<Self> {
        ensure!(sample_rate > 0, "sample rate must be non-zero");
        ensure!(channels > 0, "channel count must be non-zero");
        ensure!(
            samples.len() % channels == 0,
            "{} samples do not divide into {} channels",
            samples.len(),
            channels
        );

        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// An empty track in the given format.
    pub fn empty(sample_rate: u32, channels: usize) -> Result<Self> {
        Self::new(Vec::new(), sample_rate, channels)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether `other` shares this track's sample rate and channel count.
    pub fn same_format(&self, other: &Track) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    /// Convert seconds to the nearest frame index, clamped to `[0, frames]`.
    pub fn frame_at(&self, secs: f64) -> usize {
        let frame = (secs * self.sample_rate as f64).round();
        if frame <= 0.0 {
            0
        } else {
            (frame as usize).min(self.frames())
        }
    }

    /// Copy out frames `[start, end)`. Empty when `end <= start`.
    pub fn subclip_frames(&self, start: usize, end: usize) -> Track {
        let end = end.min(self.frames());
        let start = start.min(end);
        Track {
            samples: self.samples[start * self.channels..end * self.channels].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Copy out the time range `[start, end)` in seconds.
    pub fn subclip(&self, start: f64, end: f64) -> Track {
        self.subclip_frames(self.frame_at(start), self.frame_at(end))
    }

    /// Append `other` to the end of this track.
    pub fn append(&mut self, other: &Track) -> Result<()> {
        if !self.same_format(other) {
            bail!(
                "cannot join {} Hz/{}ch audio onto {} Hz/{}ch audio",
                other.sample_rate,
                other.channels,
                self.sample_rate,
                self.channels
            );
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Concatenate tracks in order into one.
    pub fn concat(sample_rate: u32, channels: usize, parts: &[Track]) -> Result<Track> {
        let total = parts.iter().map(|p| p.samples.len()).sum();
        let mut out = Track {
            samples: Vec::with_capacity(total),
            sample_rate,
            channels,
        };
        ensure!(sample_rate > 0 && channels > 0, "invalid output format");

        for part in parts {
            out.append(part)?;
        }
        Ok(out)
    }

    /// Produce exactly `frames` frames of this track, looping it when it is shorter.
    ///
    /// A clip shorter than `frames` is repeated `ceil(frames / self.frames())` times and then
    /// truncated; a longer clip is simply truncated.
    pub fn looped_to(&self, frames: usize) -> Result<Track> {
        if frames == 0 {
            return Ok(Track {
                samples: Vec::new(),
                sample_rate: self.sample_rate,
                channels: self.channels,
            });
        }
        ensure!(!self.is_empty(), "cannot loop an empty clip");

        let own = self.frames();
        let mut samples = if own < frames {
            let repetitions = frames.div_ceil(own);
            self.samples.repeat(repetitions)
        } else {
            self.samples.clone()
        };
        samples.truncate(frames * self.channels);

        Ok(Track {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }
}
