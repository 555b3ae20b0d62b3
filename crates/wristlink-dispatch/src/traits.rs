//! External collaborator interfaces.
//!
//! The dispatcher depends on these traits, not on any concrete host
//! integration. All of them are fire-and-forget from the core's point of
//! view: failures are logged and swallowed at the boundary, and retry (if
//! any) belongs to the collaborator.

use crate::error::DispatchError;

/// Maps a notification handle back to the originating contact's identity.
///
/// Used only while handling reply actions that arrive without an attached
/// phone number.
pub trait IdentityLookup {
    /// Look up the identity for a handle, if one is known.
    fn lookup(&self, handle: u32) -> Option<String>;
}

/// Submits outbound reply messages for delivery.
pub trait ReplyTransport {
    /// Submit a reply. The result reports submission, not delivery.
    fn send_reply(&self, phone_number: &str, text: &str) -> Result<(), DispatchError>;
}

/// Sends raw payloads to the device.
pub trait TransportSink {
    /// Queue a payload for transmission on the given endpoint.
    fn send(&self, endpoint: u16, payload: &[u8]);
}

/// A lookup that never finds anything. Useful for hosts without a
/// notification index.
pub struct NoIdentityLookup;

impl IdentityLookup for NoIdentityLookup {
    fn lookup(&self, _handle: u32) -> Option<String> {
        None
    }
}
