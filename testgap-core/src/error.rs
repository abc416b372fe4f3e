//! Error types for TestGap core.

use std::{error::Error, fmt, io};

/// Error type for TestGap core operations.
#[derive(Debug)]
pub enum TestGapError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for TestGapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for TestGapError {}

impl From<io::Error> for TestGapError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Convenience result type for TestGap core.
pub type Result<T> = std::result::Result<T, TestGapError>;
