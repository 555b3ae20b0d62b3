//! Protocol constants
//!
//! These constants define the endpoint numbers, command codes, and other
//! protocol-specific values used in the device message protocol. Multi-byte
//! integers are little-endian on the wire; application uuids are 16 raw
//! bytes in network order.

// ============================================================================
// Endpoints
// ============================================================================

/// Firmware and hardware version report (device → host).
pub const ENDPOINT_VERSION: u16 = 16;
/// Transient display messages with a severity and duration hint.
pub const ENDPOINT_SYSTEM_MESSAGE: u16 = 18;
/// Phone control (find-phone ring start/stop).
pub const ENDPOINT_PHONE_CONTROL: u16 = 33;
/// Per-application key/value messages.
pub const ENDPOINT_APP_MESSAGE: u16 = 48;
/// Application launch requests (host → device).
pub const ENDPOINT_APP_LAUNCH: u16 = 49;
/// Battery state reports.
pub const ENDPOINT_BATTERY: u16 = 2004;
/// Installed application inventory.
pub const ENDPOINT_APP_MANAGER: u16 = 6000;
/// Device-initiated data log streams.
pub const ENDPOINT_DATALOG: u16 = 6778;
/// Notification lifecycle actions taken on the device.
pub const ENDPOINT_NOTIFICATION_ACTION: u16 = 11440;

// ============================================================================
// App Message Commands
// ============================================================================

/// Push a key/value dictionary to the peer.
pub const APPMSG_PUSH: u8 = 0x01;
/// Request the peer's current state.
pub const APPMSG_REQUEST: u8 = 0x02;
/// Negative acknowledgement of a push.
pub const APPMSG_NACK: u8 = 0x7F;
/// Positive acknowledgement of a push.
pub const APPMSG_ACK: u8 = 0xFF;

// ============================================================================
// Tuple Types
// ============================================================================

/// Raw byte array value.
pub const TUPLE_TYPE_BYTES: u8 = 0;
/// NUL-terminated string value.
pub const TUPLE_TYPE_CSTRING: u8 = 1;
/// Unsigned 32-bit integer value.
pub const TUPLE_TYPE_UINT: u8 = 2;
/// Signed 32-bit integer value.
pub const TUPLE_TYPE_INT: u8 = 3;

/// Maximum size of an encoded key/value dictionary payload.
pub const MAX_DICT_SIZE: usize = 2048;

// ============================================================================
// App Launch
// ============================================================================

/// Key id of the run-state entry in a launch dictionary.
pub const LAUNCH_KEY_RUN_STATE: u32 = 1;
/// Run-state value requesting the app start running.
pub const LAUNCH_STATE_RUNNING: u32 = 1;
/// Run-state value requesting the app stop.
pub const LAUNCH_STATE_NOT_RUNNING: u32 = 0;

// ============================================================================
// Datalog Commands (device → host)
// ============================================================================

/// Open a new log session.
pub const DATALOG_OPEN: u8 = 0x01;
/// Append a chunk of records to an open session.
pub const DATALOG_DATA: u8 = 0x02;
/// Close a session.
pub const DATALOG_CLOSE: u8 = 0x03;

// ============================================================================
// Datalog Responses (host → device, high bit set)
// ============================================================================

/// Acknowledge a datalog message.
pub const DATALOG_ACK: u8 = 0x85;
/// Reject a datalog message; the device re-sends or abandons the session.
pub const DATALOG_NACK: u8 = 0x86;

// ============================================================================
// Datalog Item Types
// ============================================================================

/// Fixed-size binary records.
pub const DATALOG_ITEM_BYTES: u8 = 0;
/// NUL-terminated string records (variable length).
pub const DATALOG_ITEM_CSTRING: u8 = 1;
/// Fixed-size unsigned integer records.
pub const DATALOG_ITEM_UINT: u8 = 2;
/// Fixed-size signed integer records.
pub const DATALOG_ITEM_INT: u8 = 3;

/// Log tag used by the sleep monitor sessions.
pub const DATALOG_TAG_SLEEP: u32 = 83;

// ============================================================================
// Battery States
// ============================================================================

/// Battery state unknown or not reported.
pub const BATTERY_STATE_UNKNOWN: u8 = 0;
/// Device is charging.
pub const BATTERY_STATE_CHARGING: u8 = 1;
/// Battery is low.
pub const BATTERY_STATE_LOW: u8 = 2;
/// Battery is in the normal range.
pub const BATTERY_STATE_NORMAL: u8 = 3;

// ============================================================================
// Notification Actions
// ============================================================================

/// Dismiss one notification.
pub const NOTIFICATION_ACTION_DISMISS: u8 = 0x01;
/// Dismiss all notifications.
pub const NOTIFICATION_ACTION_DISMISS_ALL: u8 = 0x02;
/// Open the originating notification on the host.
pub const NOTIFICATION_ACTION_OPEN: u8 = 0x03;
/// Mute the originating app.
pub const NOTIFICATION_ACTION_MUTE: u8 = 0x04;
/// Reply with attached text.
pub const NOTIFICATION_ACTION_REPLY: u8 = 0x05;

// ============================================================================
// Phone Control Commands
// ============================================================================

/// Start ringing the phone (find-phone begins).
pub const PHONE_CONTROL_RING_START: u8 = 0x01;
/// Stop ringing the phone (the device was found).
pub const PHONE_CONTROL_RING_STOP: u8 = 0x02;

// ============================================================================
// App Kinds
// ============================================================================

/// Generic third-party app.
pub const APP_KIND_GENERIC: u8 = 0;
/// Activity tracker app.
pub const APP_KIND_ACTIVITY_TRACKER: u8 = 1;
/// Third-party watch face.
pub const APP_KIND_WATCHFACE: u8 = 2;
/// Built-in system app.
pub const APP_KIND_SYSTEM_APP: u8 = 3;
/// Built-in system watch face.
pub const APP_KIND_SYSTEM_WATCHFACE: u8 = 4;

// ============================================================================
// System Message Severities
// ============================================================================

/// Informational message.
pub const SEVERITY_INFO: u8 = 1;
/// Warning message.
pub const SEVERITY_WARNING: u8 = 2;
/// Error message.
pub const SEVERITY_ERROR: u8 = 3;

/// Width of the zero-padded firmware version field in a version report.
pub const VERSION_FW_FIELD_LEN: usize = 32;
/// Width of the zero-padded hardware model field in a version report.
pub const VERSION_HW_FIELD_LEN: usize = 16;
/// Width of the zero-padded name and creator fields in an app inventory entry.
pub const APP_ENTRY_FIELD_LEN: usize = 32;
