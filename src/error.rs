use thiserror::Error;

/// Scrub's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Scrub's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs. Media helpers use `anyhow` internally and are
/// folded into [`Error::MediaIo`] at the pipeline boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The transcript could not be read or lacks the expected structure.
    #[error("failed to parse transcript: {0}")]
    Parse(String),

    /// A transcript entry is missing a required field or has the wrong type.
    #[error("transcript schema error: {0}")]
    Schema(String),

    /// The flag pattern is not a valid regular expression.
    #[error("invalid flag pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An interval falls outside `[0, duration]` of the source track.
    #[error("interval [{start:.3}s, {end:.3}s) is outside the track (0s to {duration:.3}s)")]
    OutOfRange { start: f64, end: f64, duration: f64 },

    /// The spliced output has no well-defined duration, or it differs from the source.
    #[error("duration error: {0}")]
    Duration(String),

    /// Decode, encode, open or write failure from the media layer.
    #[error("media I/O error: {0}")]
    MediaIo(String),
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub(crate) fn duration(message: impl Into<String>) -> Self {
        Self::Duration(message.into())
    }

    pub(crate) fn media(message: impl Into<String>) -> Self {
        Self::MediaIo(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::MediaIo(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::MediaIo(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_context_chain_is_preserved() {
        let err: Error = anyhow::anyhow!("no audio track found")
            .context("failed to decode 'in.mp4'")
            .into();
        let text = err.to_string();
        assert!(text.contains("failed to decode 'in.mp4'"));
        assert!(text.contains("no audio track found"));
        assert!(matches!(err, Error::MediaIo(_)));
    }

    #[test]
    fn out_of_range_message_names_bounds() {
        let err = Error::OutOfRange {
            start: 9.5,
            end: 12.0,
            duration: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "interval [9.500s, 12.000s) is outside the track (0s to 10.000s)"
        );
    }
}
