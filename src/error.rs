use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A text record that could not be decoded.
    ///
    /// `line` is 1-based. Parsing stops at the first malformed line; nothing
    /// downstream runs on a partially decoded input because measure indexing
    /// would silently shift.
    #[error("Malformed input at line {line} (`{content}`): {message}")]
    MalformedInput {
        line: usize,
        content: String,
        message: String,
    },

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn malformed(line: usize, content: &str, message: impl Into<String>) -> Self {
        AnalysisError::MalformedInput {
            line,
            content: content.to_string(),
            message: message.into(),
        }
    }
}
