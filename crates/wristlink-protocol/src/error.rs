//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the device message protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Frame is too long.
    #[error("frame too long: maximum {max} bytes, got {actual}")]
    FrameTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length received.
        actual: usize,
    },

    /// The endpoint has no decoder.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(u16),

    /// Unknown app message command byte.
    #[error("unknown app message command: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Unknown tuple type in a key/value dictionary.
    #[error("unknown tuple type: {0}")]
    UnknownTupleType(u8),

    /// Invalid data in frame.
    #[error("invalid frame data: {0}")]
    InvalidData(String),

    /// UTF-8 decoding error.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
}
