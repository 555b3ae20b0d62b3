//! Per-session record assembly.

use bytes::{Buf, BytesMut};
use log::{debug, warn};
use uuid::Uuid;

use wristlink_protocol::{
    DeviceEvent, DATALOG_ITEM_CSTRING, DATALOG_TAG_SLEEP,
};

/// Lifecycle state of a data log session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created by an OPEN message; no data received yet.
    Open,
    /// At least one chunk has been received.
    Receiving,
    /// Ended by a CLOSE message or transport teardown.
    Closed,
}

/// One open log stream, keyed by its device-assigned session id.
#[derive(Debug)]
pub struct DatalogSession {
    id: u8,
    uuid: Uuid,
    tag: u32,
    item_type: u8,
    item_size: u16,
    created_at: u32,
    description: &'static str,
    state: SessionState,
    buffer: BytesMut,
}

/// Size of one sleep monitor record:
/// window_start(4) + window_end(4) + base_timestamp(4) + alarm_fired(1).
const SLEEP_ITEM_SIZE: usize = 13;

impl DatalogSession {
    /// Create a session from an OPEN header. `item_size` must be non-zero
    /// for fixed-size item types (the tracker validates this).
    pub fn new(id: u8, uuid: Uuid, created_at: u32, tag: u32, item_type: u8, item_size: u16) -> Self {
        let description = match tag {
            DATALOG_TAG_SLEEP => "sleep monitor",
            _ => "(unknown)",
        };
        DatalogSession {
            id,
            uuid,
            tag,
            item_type,
            item_size,
            created_at,
            description,
            state: SessionState::Open,
            buffer: BytesMut::new(),
        }
    }

    /// The device-assigned session id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The owning application uuid.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The session's log tag.
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Creation timestamp reported by the device (unix seconds).
    pub fn created_at(&self) -> u32 {
        self.created_at
    }

    /// Human-readable tag description.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of bytes accumulated toward the next item.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Append a chunk and surface every completed item as a device event.
    ///
    /// Chunks are applied in arrival order; a chunk may complete zero, one,
    /// or several items.
    pub fn append(&mut self, chunk: &[u8]) -> Vec<DeviceEvent> {
        self.state = SessionState::Receiving;
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(item) = self.take_item() {
            if let Some(event) = self.interpret_item(&item) {
                events.push(event);
            }
        }
        events
    }

    /// Close the session, discarding any partially accumulated item.
    pub fn close(&mut self) {
        if !self.buffer.is_empty() {
            debug!(
                "datalog session {}: discarding {} byte partial item at close",
                self.id,
                self.buffer.len()
            );
            self.buffer.clear();
        }
        self.state = SessionState::Closed;
    }

    /// Split one complete item off the front of the buffer, if available.
    ///
    /// Fixed-size item types complete at exactly `item_size` bytes; the
    /// c-string item type completes at its NUL terminator.
    fn take_item(&mut self) -> Option<Vec<u8>> {
        if self.item_type == DATALOG_ITEM_CSTRING {
            let end = self.buffer.iter().position(|&b| b == 0)?;
            let item = self.buffer.split_to(end).to_vec();
            self.buffer.advance(1); // Drop the terminator.
            Some(item)
        } else {
            let size = self.item_size as usize;
            if self.buffer.len() < size {
                return None;
            }
            Some(self.buffer.split_to(size).to_vec())
        }
    }

    /// Turn one complete item into a device event.
    fn interpret_item(&self, item: &[u8]) -> Option<DeviceEvent> {
        if self.tag == DATALOG_TAG_SLEEP {
            if item.len() != SLEEP_ITEM_SIZE {
                warn!(
                    "datalog session {}: sleep record with size {}, expected {}",
                    self.id,
                    item.len(),
                    SLEEP_ITEM_SIZE
                );
                return None;
            }
            let window_start = u32::from_le_bytes([item[0], item[1], item[2], item[3]]);
            let window_end = u32::from_le_bytes([item[4], item[5], item[6], item[7]]);
            let base_timestamp = u32::from_le_bytes([item[8], item[9], item[10], item[11]]);
            let alarm_fired = item[12] != 0;
            return Some(DeviceEvent::SleepMonitorResult {
                window_start,
                window_end,
                base_timestamp,
                alarm_fired,
            });
        }

        Some(DeviceEvent::DatalogRecord {
            uuid: self.uuid,
            tag: self.tag,
            data: item.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wristlink_protocol::DATALOG_ITEM_BYTES;

    fn test_uuid() -> Uuid {
        Uuid::from_bytes([3; 16])
    }

    fn sleep_item(start: u32, end: u32, base: u32, alarm: bool) -> Vec<u8> {
        let mut item = Vec::with_capacity(SLEEP_ITEM_SIZE);
        item.extend_from_slice(&start.to_le_bytes());
        item.extend_from_slice(&end.to_le_bytes());
        item.extend_from_slice(&base.to_le_bytes());
        item.push(alarm as u8);
        item
    }

    #[test]
    fn test_fixed_size_items_across_chunks() {
        let mut session =
            DatalogSession::new(1, test_uuid(), 0, 999, DATALOG_ITEM_BYTES, 4);

        // First chunk completes one item and leaves two bytes over.
        let events = session.append(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(events.len(), 1);
        assert_eq!(session.buffered_len(), 2);

        // Second chunk completes the straddling item.
        let events = session.append(&[7, 8]);
        assert_eq!(events.len(), 1);
        match &events[0] {
            DeviceEvent::DatalogRecord { data, tag, .. } => {
                assert_eq!(*tag, 999);
                assert_eq!(data, &vec![5, 6, 7, 8]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(session.buffered_len(), 0);
    }

    #[test]
    fn test_cstring_items() {
        let mut session =
            DatalogSession::new(1, test_uuid(), 0, 999, DATALOG_ITEM_CSTRING, 0);

        let events = session.append(b"first\0sec");
        assert_eq!(events.len(), 1);
        match &events[0] {
            DeviceEvent::DatalogRecord { data, .. } => assert_eq!(data, b"first"),
            other => panic!("unexpected event: {:?}", other),
        }

        let events = session.append(b"ond\0");
        assert_eq!(events.len(), 1);
        match &events[0] {
            DeviceEvent::DatalogRecord { data, .. } => assert_eq!(data, b"second"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_sleep_records() {
        let mut session = DatalogSession::new(
            2,
            test_uuid(),
            0,
            DATALOG_TAG_SLEEP,
            DATALOG_ITEM_BYTES,
            SLEEP_ITEM_SIZE as u16,
        );

        let events = session.append(&sleep_item(1000, 2000, 500, true));
        assert_eq!(
            events,
            vec![DeviceEvent::SleepMonitorResult {
                window_start: 1000,
                window_end: 2000,
                base_timestamp: 500,
                alarm_fired: true,
            }]
        );
    }

    #[test]
    fn test_close_discards_partial() {
        let mut session =
            DatalogSession::new(1, test_uuid(), 0, 999, DATALOG_ITEM_BYTES, 8);

        let events = session.append(&[1, 2, 3]);
        assert!(events.is_empty());
        assert_eq!(session.buffered_len(), 3);

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.buffered_len(), 0);
    }
}
