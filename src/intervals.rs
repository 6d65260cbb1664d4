//! Redaction interval extraction and validation.
//!
//! Flow:
//! - `extract` selects flagged transcript words and keeps only well-formed time ranges
//! - `normalize` sorts ranges by start and merges overlaps
//! - `ensure_within` rejects ranges that fall outside the source track

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::transcript::TranscriptEntry;

/// Default flag marker: a word wrapped in double asterisks, e.g. `**darn**`.
pub const DEFAULT_FLAG_PATTERN: &str = r"\*\*\w+\*\*";

/// A half-open `[start, end)` range in seconds to be replaced with tone.
///
/// Invariant: `start < end`, both finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RedactionInterval {
    pub start: f64,
    pub end: f64,
}

impl RedactionInterval {
    /// Build an interval, returning `None` for empty or inverted ranges.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (start.is_finite() && end.is_finite() && start < end).then_some(Self { start, end })
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Compile a flag pattern.
pub fn flag_pattern(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(pattern)?)
}

/// Select flagged entries and return their time ranges in transcript order.
///
/// Entries are selected when `word` contains a match for `pattern` anywhere (not a whole-word
/// match). Flagged entries with a missing time or with `start >= end` are dropped silently.
pub fn extract(entries: &[TranscriptEntry], pattern: &Regex) -> Vec<RedactionInterval> {
    entries
        .iter()
        .filter(|e| pattern.is_match(&e.word))
        .filter_map(|e| {
            let interval = RedactionInterval::new(e.start?, e.end?);
            if interval.is_none() {
                tracing::debug!(word = %e.word, "dropping flagged word with invalid times");
            }
            interval
        })
        .collect()
}

/// Sort intervals by start and merge any that overlap.
///
/// Intervals that merely touch (`next.start == prev.end`) stay separate.
pub fn normalize(mut intervals: Vec<RedactionInterval>) -> Vec<RedactionInterval> {
    intervals.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

    let mut merged: Vec<RedactionInterval> = Vec::with_capacity(intervals.len());
    for next in intervals {
        match merged.last_mut() {
            Some(prev) if next.start < prev.end => {
                tracing::warn!(
                    prev_start = prev.start,
                    prev_end = prev.end,
                    next_start = next.start,
                    next_end = next.end,
                    "merging overlapping intervals"
                );
                prev.end = prev.end.max(next.end);
            }
            _ => merged.push(next),
        }
    }

    merged
}

/// Fail with `OutOfRange` if any interval leaves `[0, duration]`.
///
/// `tolerance` absorbs rounding at the track end (callers pass half a frame).
pub fn ensure_within(
    intervals: &[RedactionInterval],
    duration: f64,
    tolerance: f64,
) -> Result<()> {
    for iv in intervals {
        if iv.start < 0.0 || iv.end > duration + tolerance {
            return Err(Error::OutOfRange {
                start: iv.start,
                end: iv.end,
                duration,
            });
        }
    }
    Ok(())
}
