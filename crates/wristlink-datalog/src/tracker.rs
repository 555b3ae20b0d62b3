//! Session tracking and wire decoding.
//!
//! Frame formats (all integers little-endian):
//!
//! | Command | Layout                                                              |
//! |---------|---------------------------------------------------------------------|
//! | OPEN    | cmd(1) id(1) uuid(16) created_at(4) tag(4) item_type(1) item_size(2)|
//! | DATA    | cmd(1) id(1) items_left(4) chunk(rest)                              |
//! | CLOSE   | cmd(1) id(1)                                                        |
//!
//! The host answers every message with `ACK(id)` or `NACK(id)`; responses
//! surface as [`DeviceEvent::SendBytes`] so the dispatcher routes them to
//! the transport with everything else.

use std::collections::HashMap;

use log::{debug, warn};
use uuid::Uuid;

use wristlink_protocol::{
    DeviceEvent, ProtocolError, DATALOG_ACK, DATALOG_CLOSE, DATALOG_DATA, DATALOG_ITEM_CSTRING,
    DATALOG_NACK, DATALOG_OPEN, ENDPOINT_DATALOG,
};

use crate::error::DatalogError;
use crate::session::DatalogSession;

/// Tracks every live data log session for one device.
#[derive(Debug, Default)]
pub struct DatalogTracker {
    sessions: HashMap<u8, DatalogSession>,
}

impl DatalogTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        DatalogTracker {
            sessions: HashMap::new(),
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Get a live session by id.
    pub fn session(&self, id: u8) -> Option<&DatalogSession> {
        self.sessions.get(&id)
    }

    /// Handle one data log payload, producing record events and the
    /// acknowledgement to send back.
    pub fn handle_message(&mut self, payload: &[u8]) -> Result<Vec<DeviceEvent>, DatalogError> {
        if payload.len() < 2 {
            return Err(ProtocolError::FrameTooShort {
                expected: 2,
                actual: payload.len(),
            }
            .into());
        }

        let command = payload[0];
        let id = payload[1];

        match command {
            DATALOG_OPEN => self.handle_open(id, payload),
            DATALOG_DATA => self.handle_data(id, payload),
            DATALOG_CLOSE => self.handle_close(id),
            other => Err(DatalogError::UnknownCommand(other)),
        }
    }

    /// Close every live session, discarding partial items. Called on
    /// transport teardown.
    pub fn close_all(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            session.close();
        }
    }

    fn handle_open(&mut self, id: u8, payload: &[u8]) -> Result<Vec<DeviceEvent>, DatalogError> {
        // cmd(1) + id(1) + uuid(16) + created_at(4) + tag(4) + item_type(1) + item_size(2)
        if payload.len() < 29 {
            return Err(ProtocolError::FrameTooShort {
                expected: 29,
                actual: payload.len(),
            }
            .into());
        }

        let uuid = Uuid::from_slice(&payload[2..18])
            .map_err(|e| ProtocolError::InvalidData(e.to_string()))?;
        let created_at = u32::from_le_bytes([payload[18], payload[19], payload[20], payload[21]]);
        let tag = u32::from_le_bytes([payload[22], payload[23], payload[24], payload[25]]);
        let item_type = payload[26];
        let item_size = u16::from_le_bytes([payload[27], payload[28]]);

        // Variable-length items carry their own terminator; everything else
        // needs a usable size.
        if item_size == 0 && item_type != DATALOG_ITEM_CSTRING {
            warn!("datalog open for session {} with zero item size, rejecting", id);
            return Ok(vec![nack(id)]);
        }

        // A reused id implicitly closes the previous occupant.
        if let Some(mut previous) = self.sessions.remove(&id) {
            warn!(
                "datalog session id {} conflict: closing previous {} stream ({} partial bytes dropped)",
                id,
                previous.description(),
                previous.buffered_len()
            );
            previous.close();
        }

        let session = DatalogSession::new(id, uuid, created_at, tag, item_type, item_size);
        debug!(
            "datalog session {} opened: {} tag {} for app {}",
            id,
            session.description(),
            tag,
            uuid
        );
        self.sessions.insert(id, session);

        Ok(vec![ack(id)])
    }

    fn handle_data(&mut self, id: u8, payload: &[u8]) -> Result<Vec<DeviceEvent>, DatalogError> {
        // cmd(1) + id(1) + items_left(4)
        if payload.len() < 6 {
            return Err(ProtocolError::FrameTooShort {
                expected: 6,
                actual: payload.len(),
            }
            .into());
        }

        let Some(session) = self.sessions.get_mut(&id) else {
            warn!("datalog data for unknown session {}", id);
            return Ok(vec![nack(id)]);
        };

        let items_left =
            u32::from_le_bytes([payload[2], payload[3], payload[4], payload[5]]);
        let mut events = session.append(&payload[6..]);
        debug!(
            "datalog session {}: {} events assembled, {} items left on device",
            id,
            events.len(),
            items_left
        );

        events.push(ack(id));
        Ok(events)
    }

    fn handle_close(&mut self, id: u8) -> Result<Vec<DeviceEvent>, DatalogError> {
        match self.sessions.remove(&id) {
            Some(mut session) => {
                session.close();
                debug!("datalog session {} closed", id);
            }
            None => debug!("datalog close for unknown session {}", id),
        }
        Ok(vec![ack(id)])
    }
}

fn ack(id: u8) -> DeviceEvent {
    DeviceEvent::SendBytes {
        endpoint: ENDPOINT_DATALOG,
        data: vec![DATALOG_ACK, id],
    }
}

fn nack(id: u8) -> DeviceEvent {
    DeviceEvent::SendBytes {
        endpoint: ENDPOINT_DATALOG,
        data: vec![DATALOG_NACK, id],
    }
}
