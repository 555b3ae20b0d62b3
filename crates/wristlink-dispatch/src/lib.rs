//! Device event dispatching.
//!
//! This crate is the front door for one connected device. Frames arrive
//! from the transport as `(endpoint, payload)` pairs; the [`DeviceSession`]
//! routes each payload through the right decoder (system endpoints, app
//! message codecs, data log tracker) and hands every resulting
//! [`DeviceEvent`](wristlink_protocol::DeviceEvent) to the [`Dispatcher`],
//! which executes the host-side action: updating the device record,
//! emitting a [`HostSignal`], submitting an outbound reply, or sending raw
//! bytes back to the device.
//!
//! Event handling is serialized per device: one event runs to completion
//! before the next is taken, so device-record fields touched by several
//! event kinds never race. Side effects toward collaborators are
//! fire-and-forget; their failures are logged and swallowed here, never
//! retried.

mod config;
mod device;
mod dispatcher;
mod error;
mod session;
mod signals;
mod traits;

pub use config::*;
pub use device::*;
pub use dispatcher::*;
pub use error::*;
pub use session::*;
pub use signals::*;
pub use traits::*;
