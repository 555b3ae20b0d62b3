//! Dispatch error types.

use thiserror::Error;

/// Errors surfaced by external collaborators during dispatch.
///
/// These never propagate out of the event loop; the dispatcher logs them
/// and emits the corresponding failure signal.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// An outbound reply could not be submitted for delivery.
    #[error("reply delivery failed: {0}")]
    ReplyDelivery(String),
}
