//! Data log error types.

use thiserror::Error;
use wristlink_protocol::ProtocolError;

/// Errors that can occur while tracking data log sessions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatalogError {
    /// The frame could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Unknown data log command byte.
    #[error("unknown data log command: 0x{0:02X}")]
    UnknownCommand(u8),
}
