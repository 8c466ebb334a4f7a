//! Structured error types for fnprobe
//!
//! Using thiserror for automatic Display implementation and error chaining.

use fnprobe_common::EventListError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstrumentError {
    #[error("{line}:{column}: parse error: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("C grammar could not be loaded: {0}")]
    LanguageUnavailable(String),

    #[error("Invalid event selection: {0}")]
    InvalidEvents(#[from] EventListError),

    #[error("Edit at offset {offset} is outside the source ({len} bytes)")]
    EditOutOfBounds { offset: usize, len: usize },

    #[error("Edit at offset {0} does not fall on a character boundary")]
    EditNotOnCharBoundary(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = InstrumentError::Parse {
            line: 3,
            column: 14,
            message: "unexpected `}`".into(),
        };
        assert_eq!(err.to_string(), "3:14: parse error: unexpected `}`");
    }

    #[test]
    fn test_invalid_events_chains_message() {
        let err = InstrumentError::from(EventListError::Empty);
        assert!(err.to_string().contains("event list is empty"));
    }
}
