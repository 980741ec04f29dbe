//! Error types for promptsafe.

use crate::pipeline::Stage;
use std::io;
use thiserror::Error;

/// Result type alias for promptsafe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for promptsafe.
///
/// [`crate::clean`] never surfaces these; they are routed to the fallback path.
/// [`crate::try_clean`] returns them to callers that want to know why.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading input text.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(String),

    /// The cleaning options are inconsistent.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A stage panicked while transforming the text.
    #[error("Stage '{stage}' panicked: {message}")]
    StagePanicked { stage: Stage, message: String },

    /// The cleaned text did not pass validation.
    #[error(
        "Validation failed: {word_count} words / {length} chars \
         (need {min_words} words and {min_chars} chars)"
    )]
    ValidationFailed {
        word_count: usize,
        length: usize,
        min_words: usize,
        min_chars: usize,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl Error {
    /// Short reason string used in fallback reports and log lines.
    pub fn reason(&self) -> String {
        match self {
            Error::ValidationFailed { .. } => "validation failed".to_string(),
            Error::StagePanicked { stage, .. } => format!("stage '{}' panicked", stage),
            other => other.to_string(),
        }
    }
}
