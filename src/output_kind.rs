/// What the pipeline writes.
///
/// Why this exists:
/// - We want a single, strongly-typed choice of output shape across the CLI and library code.
/// - One pipeline handles both shapes; only the final encode step differs.
///
/// Integration notes:
/// - With the `cli` feature, `ValueEnum` lets this enum be used directly as a `clap` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputKind {
    /// Write the scrubbed audio track only.
    #[default]
    Audio,

    /// Re-mux the source's video stream with the scrubbed audio.
    Video,
}
