//! Timeline splicing: replace redacted ranges with tone while keeping the timeline intact.
//!
//! The work is split in two:
//! - `plan` turns sorted intervals into an ordered list of segments (pure frame arithmetic)
//! - `splice` renders that plan against the source track and the tone clip
//!
//! Invariant: the output has exactly as many frames as the source.

use crate::error::{Error, Result};
use crate::intervals::{RedactionInterval, ensure_within};
use crate::track::Track;

/// One piece of the output timeline, in source frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Copy source frames `[start, end)` unchanged.
    PassThrough { start: usize, end: usize },

    /// Emit `frames` frames of (looped) tone.
    Tone { frames: usize },
}

impl Segment {
    pub fn frames(&self) -> usize {
        match *self {
            Segment::PassThrough { start, end } => end - start,
            Segment::Tone { frames } => frames,
        }
    }
}

/// Lay out pass-through and tone segments for `intervals` over a track of `total_frames`.
///
/// `intervals` must be sorted and non-overlapping (see `intervals::normalize`); each is given
/// as `[start, end)` frame indices. Zero-length pass-through segments are omitted.
pub fn plan(intervals: &[(usize, usize)], total_frames: usize) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(intervals.len() * 2 + 1);
    let mut last_end = 0usize;

    for &(start, end) in intervals {
        let start = start.clamp(last_end, total_frames);
        let end = end.clamp(start, total_frames);

        if start > last_end {
            segments.push(Segment::PassThrough {
                start: last_end,
                end: start,
            });
        }
        if end > start {
            segments.push(Segment::Tone {
                frames: end - start,
            });
        }
        last_end = end;
    }

    if total_frames > last_end {
        segments.push(Segment::PassThrough {
            start: last_end,
            end: total_frames,
        });
    }

    segments
}

/// Build the output track: `source` outside `intervals`, `tone` inside them.
///
/// Fails with `OutOfRange` when an interval leaves the source, `Duration` when either track
/// is degenerate or the result does not match the source length, and `MediaIo` when the tone
/// is not in the source's format.
pub fn splice(source: &Track, tone: &Track, intervals: &[RedactionInterval]) -> Result<Track> {
    let duration = source.duration();
    if source.is_empty() || !duration.is_finite() {
        return Err(Error::duration("source track has no audio"));
    }
    if !source.same_format(tone) {
        return Err(Error::media(format!(
            "tone is {} Hz/{}ch but source is {} Hz/{}ch",
            tone.sample_rate(),
            tone.channels(),
            source.sample_rate(),
            source.channels()
        )));
    }

    let half_frame = 0.5 / source.sample_rate() as f64;
    ensure_within(intervals, duration, half_frame)?;

    let frame_ranges: Vec<(usize, usize)> = intervals
        .iter()
        .map(|iv| {
            let range = (source.frame_at(iv.start), source.frame_at(iv.end));
            tracing::info!(
                start = iv.start,
                end = iv.end,
                start_frame = range.0,
                end_frame = range.1,
                "processing interval"
            );
            range
        })
        .collect();

    let segments = plan(&frame_ranges, source.frames());

    if tone.is_empty() && segments.iter().any(|s| matches!(s, Segment::Tone { .. })) {
        return Err(Error::duration("tone clip has no audio"));
    }

    let mut parts = Vec::with_capacity(segments.len());
    for seg in &segments {
        let part = match *seg {
            Segment::PassThrough { start, end } => source.subclip_frames(start, end),
            Segment::Tone { frames } => tone.looped_to(frames)?,
        };
        parts.push(part);
    }

    let out = Track::concat(source.sample_rate(), source.channels(), &parts)?;

    let out_duration = out.duration();
    if !out_duration.is_finite() || out.frames() != source.frames() {
        return Err(Error::duration(format!(
            "spliced track is {out_duration}s ({} frames), source is {duration}s ({} frames)",
            out.frames(),
            source.frames()
        )));
    }

    Ok(out)
}
