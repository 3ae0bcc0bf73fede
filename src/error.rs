//! Error types for testjson

use std::io;
use thiserror::Error;

/// Result type alias for testjson operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testjson
#[derive(Error, Debug)]
pub enum Error {
    /// A single input line could not be parsed as a test event.
    ///
    /// This is always recovered inside the scan loop: the line is reported
    /// through the handler and scanning continues.
    #[error("failed to parse test event: {line}")]
    MalformedEvent {
        /// The offending input line, retained for diagnostics.
        line: String,
    },

    /// Reading the input stream failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Other error with custom message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_event_display() {
        let err = Error::MalformedEvent {
            line: "not json".to_string(),
        };
        assert_eq!(err.to_string(), "failed to parse test event: not json");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "custom error".into();
        assert_eq!(err.to_string(), "custom error");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
