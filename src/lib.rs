//! `scrub` — beep out flagged words in audio and video using word-level transcripts.
//!
//! This crate provides:
//! - Transcript loading and flagged-word interval extraction
//! - Duration-preserving splicing of tone into an audio timeline
//! - Media decoding (Symphonia) and output encoding (WAV, or ffmpeg for everything else)
//!
//! Most consumers should start with [`scrub::Scrubber`].

// High-level API (most consumers should start here).
pub mod opts;
pub mod scrub;

// Error taxonomy.
mod error;
pub use error::{Error, Result};

// Transcript → intervals.
pub mod intervals;
pub mod transcript;

// Timeline model and splicing.
pub mod splice;
pub mod tone;
pub mod track;

// Audio decoding and normalization.
pub mod audio_pipeline;
pub mod decoder;
pub mod wav;

// Output selection and encoding.
pub mod encode;
pub mod output_kind;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;
