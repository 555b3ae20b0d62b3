//! Wristlink Device Message Protocol
//!
//! This crate provides types and utilities for exchanging messages with the
//! wearable companion device. The transport layer delivers already-delimited
//! frames as `(endpoint, payload)` pairs; this crate turns those payloads
//! into typed [`DeviceEvent`]s and encodes outbound payloads for the
//! transport to send.
//!
//! # Protocol Overview
//!
//! Each frame is addressed to a 16-bit endpoint. Three endpoint families
//! matter to the host:
//!
//! - **System endpoints** (version, battery, app inventory, notification
//!   actions, phone control, system messages): fixed formats decoded by
//!   [`decode_system_message`].
//! - **App messages** (`ENDPOINT_APP_MESSAGE`): per-application key/value
//!   dictionaries. The key ids are assigned per third-party watch app and
//!   only mean something once resolved through that app's key manifest,
//!   which is the job of the codec layer above this crate.
//! - **Data logs** (`ENDPOINT_DATALOG`): device-initiated record streams,
//!   tracked by the datalog crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use wristlink_protocol::{decode_system_message, DeviceEvent, ENDPOINT_VERSION};
//!
//! let event = decode_system_message(ENDPOINT_VERSION, &payload)?;
//! match event {
//!     DeviceEvent::VersionInfo { firmware_version, .. } => { /* ... */ }
//!     _ => {}
//! }
//! ```

mod appmessage;
mod constants;
mod dict;
mod error;
mod event;
mod system;

pub use appmessage::*;
pub use constants::*;
pub use dict::*;
pub use error::*;
pub use event::*;
pub use system::*;
