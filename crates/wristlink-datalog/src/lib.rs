//! Data log session tracking.
//!
//! The device opens id-addressed log streams toward the host and feeds them
//! chunked binary records. Each session carries a type/size header that
//! fixes the shape of its records; the tracker assembles chunks into
//! complete items and surfaces each item as a typed device event.
//!
//! # Message Flow
//!
//! ```text
//! device → host : OPEN  (id, uuid, created_at, tag, item_type, item_size)
//! host   → device: ACK  (id)
//! device → host : DATA  (id, items_left, chunk)      repeated
//! host   → device: ACK  (id)
//! device → host : CLOSE (id)
//! host   → device: ACK  (id)
//! ```
//!
//! Devices recycle the small session id space aggressively: an OPEN for an
//! id that is still live force-closes the previous occupant and drops its
//! partially accumulated item.

mod error;
mod session;
mod tracker;

pub use error::*;
pub use session::*;
pub use tracker::*;
