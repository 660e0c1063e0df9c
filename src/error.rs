//! Error types for the humstruct library

use std::io;

/// Library error type for humstruct operations.
///
/// Analysis passes report these through the validity flag of
/// [`HumdrumFile`](crate::HumdrumFile) rather than by unwinding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HumError {
    /// Unbalanced spine manipulator or malformed line
    #[error("structural error on line {line}: {message}")]
    Structural { line: usize, message: String },

    /// Two paths disagree on the timing of a line, or a duration went negative
    #[error("inconsistent rhythm near line {line}: {message}")]
    RhythmInconsistency { line: usize, message: String },

    /// A spine starting mid-file never reaches a line with known timing
    #[error("cannot link floating spine of track {track} (line {line}) to score")]
    AnchorNotFound { track: usize, line: usize },

    /// Grace notes and regular notes on the same line
    #[error("grace note and regular note cannot occur on same line {line}: {text}")]
    MixedGraceAndRegular { line: usize, text: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<io::Error> for HumError {
    fn from(error: io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}
