//! Codec error types.

use thiserror::Error;
use uuid::Uuid;
use wristlink_protocol::ProtocolError;

/// Errors that can occur when encoding outbound app messages.
#[derive(Error, Debug)]
pub enum CodecError {
    /// No codec is registered for the application.
    #[error("no codec registered for app {0}")]
    UnknownApp(Uuid),

    /// A symbolic key name could not be resolved through the app's
    /// manifest. Outbound encodes fail closed; no partial command is sent.
    #[error("app {uuid} has no key named '{name}'")]
    UnresolvedKey {
        /// Owning application uuid.
        uuid: Uuid,
        /// The unresolvable key name.
        name: String,
    },

    /// The encoded payload was structurally invalid.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
