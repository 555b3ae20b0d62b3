//! The host-side record of one device.

use wristlink_protocol::BatteryState;

/// Mutable host-side state for one connected device.
///
/// Only the dispatcher writes these fields, and only while handling a
/// single event, so readers observing the record between events see a
/// consistent snapshot.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// User-facing device name.
    pub name: String,
    /// Firmware version, once reported.
    pub firmware_version: Option<String>,
    /// Hardware model, once reported.
    pub hardware_model: Option<String>,
    /// Battery level percentage, once reported.
    pub battery_level: Option<u8>,
    /// Battery charging state.
    pub battery_state: BatteryState,
    /// Time of the last full charge (unix seconds), if reported.
    pub last_charge_time: Option<u32>,
    /// Number of charge cycles, if reported.
    pub charge_cycles: Option<u32>,
}

impl DeviceRecord {
    /// Create a record for a newly connected device.
    pub fn new(name: impl Into<String>) -> Self {
        DeviceRecord {
            name: name.into(),
            firmware_version: None,
            hardware_model: None,
            battery_level: None,
            battery_state: BatteryState::Unknown,
            last_charge_time: None,
            charge_cycles: None,
        }
    }
}
