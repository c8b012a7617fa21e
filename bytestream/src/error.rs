//! Error types for byte stream operations.

use std::fmt;

/// Result type for byte stream operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading from a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    Underflow {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underflow {
                requested,
                available,
            } => {
                write!(
                    f,
                    "buffer underflow: requested {requested} bytes, {available} available"
                )
            }
        }
    }
}

impl std::error::Error for ByteError {}
