use std::path::PathBuf;
use thiserror::Error;

use crate::records::QuestionIdError;

/// Failure of a scoring pass. Only raised in strict mode; otherwise the same
/// condition is reported as a diagnostic.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("malformed question id '{question_id}': {source}")]
    MalformedRecord {
        question_id: String,
        #[source]
        source: QuestionIdError,
    },
}

/// Structurally invalid prediction input. Always fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON array of prediction records in {}", path.display())]
    NotAnArray { path: PathBuf },

    #[error("record {index} in {}: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        reason: String,
    },
}
