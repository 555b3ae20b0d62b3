//! System endpoint decoding.
//!
//! The device reports its own state over a handful of fixed-format
//! endpoints. Each decoder here validates the payload length and produces
//! exactly one [`DeviceEvent`].

use crate::constants::*;
use crate::error::ProtocolError;
use crate::event::*;

/// Decode a system endpoint payload into a device event.
///
/// Returns [`ProtocolError::UnknownEndpoint`] for endpoints this module does
/// not decode (app messages and data logs have their own layers).
pub fn decode_system_message(endpoint: u16, payload: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    match endpoint {
        ENDPOINT_VERSION => decode_version(payload),
        ENDPOINT_BATTERY => decode_battery(payload),
        ENDPOINT_APP_MANAGER => decode_app_inventory(payload),
        ENDPOINT_NOTIFICATION_ACTION => decode_notification_action(payload),
        ENDPOINT_PHONE_CONTROL => decode_phone_control(payload),
        ENDPOINT_SYSTEM_MESSAGE => decode_system_display(payload),
        other => Err(ProtocolError::UnknownEndpoint(other)),
    }
}

/// Version report: fw_version(32, zero-padded) + hw_model(16, zero-padded).
fn decode_version(payload: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    let expected = VERSION_FW_FIELD_LEN + VERSION_HW_FIELD_LEN;
    if payload.len() < expected {
        return Err(ProtocolError::FrameTooShort {
            expected,
            actual: payload.len(),
        });
    }

    let firmware_version = read_padded_str(&payload[..VERSION_FW_FIELD_LEN])?;
    let hardware_model =
        read_padded_str(&payload[VERSION_FW_FIELD_LEN..VERSION_FW_FIELD_LEN + VERSION_HW_FIELD_LEN])?;

    Ok(DeviceEvent::VersionInfo {
        firmware_version,
        hardware_model,
    })
}

/// Battery report: level(1) + state(1) + flags(1) [+ last_charge(4)] [+ cycles(4)].
///
/// Flag bit 0 marks the last-charge timestamp as present, bit 1 the charge
/// cycle count.
fn decode_battery(payload: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    if payload.len() < 3 {
        return Err(ProtocolError::FrameTooShort {
            expected: 3,
            actual: payload.len(),
        });
    }

    let level_percent = payload[0];
    if level_percent > 100 {
        return Err(ProtocolError::InvalidData(format!(
            "battery level out of range: {}",
            level_percent
        )));
    }
    let state = BatteryState::from(payload[1]);
    let flags = payload[2];

    let mut i = 3;
    let last_charge_time = if flags & 0x01 != 0 {
        if payload.len() < i + 4 {
            return Err(ProtocolError::FrameTooShort {
                expected: i + 4,
                actual: payload.len(),
            });
        }
        let ts = u32::from_le_bytes([payload[i], payload[i + 1], payload[i + 2], payload[i + 3]]);
        i += 4;
        Some(ts)
    } else {
        None
    };

    let charge_cycles = if flags & 0x02 != 0 {
        if payload.len() < i + 4 {
            return Err(ProtocolError::FrameTooShort {
                expected: i + 4,
                actual: payload.len(),
            });
        }
        Some(u32::from_le_bytes([
            payload[i],
            payload[i + 1],
            payload[i + 2],
            payload[i + 3],
        ]))
    } else {
        None
    };

    Ok(DeviceEvent::BatteryInfo {
        level_percent,
        state,
        last_charge_time,
        charge_cycles,
    })
}

/// App inventory: count(1) then per entry
/// uuid(16) + kind(1) + name(32, zero-padded) + creator(32, zero-padded).
fn decode_app_inventory(payload: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::FrameTooShort {
            expected: 1,
            actual: 0,
        });
    }

    const ENTRY_SIZE: usize = 16 + 1 + APP_ENTRY_FIELD_LEN + APP_ENTRY_FIELD_LEN;

    let count = payload[0] as usize;
    let expected = 1 + count * ENTRY_SIZE;
    if payload.len() < expected {
        return Err(ProtocolError::FrameTooShort {
            expected,
            actual: payload.len(),
        });
    }

    let mut apps = Vec::with_capacity(count);
    let mut i = 1;
    for _ in 0..count {
        let uuid = uuid::Uuid::from_slice(&payload[i..i + 16])
            .map_err(|e| ProtocolError::InvalidData(e.to_string()))?;
        i += 16;
        let kind = AppKind::try_from(payload[i])?;
        i += 1;
        let name = read_padded_str(&payload[i..i + APP_ENTRY_FIELD_LEN])?;
        i += APP_ENTRY_FIELD_LEN;
        let creator = read_padded_str(&payload[i..i + APP_ENTRY_FIELD_LEN])?;
        i += APP_ENTRY_FIELD_LEN;

        apps.push(AppEntry {
            uuid,
            name,
            creator,
            kind,
        });
    }

    Ok(DeviceEvent::AppInfo { apps })
}

/// Notification action: action(1) + handle(4) + flags(1)
/// [+ phone_number NUL-terminated] [+ reply NUL-terminated].
///
/// Flag bit 0 marks the phone number as present, bit 1 the reply text.
fn decode_notification_action(payload: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    if payload.len() < 6 {
        return Err(ProtocolError::FrameTooShort {
            expected: 6,
            actual: payload.len(),
        });
    }

    let action = NotificationAction::try_from(payload[0])?;
    let handle = u32::from_le_bytes([payload[1], payload[2], payload[3], payload[4]]);
    let flags = payload[5];

    let mut rest = &payload[6..];
    let phone_number = if flags & 0x01 != 0 {
        let (s, remaining) = read_nul_str(rest)?;
        rest = remaining;
        Some(s)
    } else {
        None
    };
    let reply = if flags & 0x02 != 0 {
        let (s, _) = read_nul_str(rest)?;
        Some(s)
    } else {
        None
    };

    Ok(DeviceEvent::NotificationControl {
        action,
        handle,
        phone_number,
        reply,
    })
}

/// Phone control: command(1).
fn decode_phone_control(payload: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::FrameTooShort {
            expected: 1,
            actual: 0,
        });
    }

    let phase = match payload[0] {
        PHONE_CONTROL_RING_START => FindPhonePhase::Start,
        PHONE_CONTROL_RING_STOP => FindPhonePhase::Stop,
        other => {
            return Err(ProtocolError::InvalidData(format!(
                "unknown phone control command: 0x{:02X}",
                other
            )))
        }
    };

    Ok(DeviceEvent::FindPhone { phase })
}

/// System message: severity(1) + duration_ms(2) + text(rest).
fn decode_system_display(payload: &[u8]) -> Result<DeviceEvent, ProtocolError> {
    if payload.len() < 3 {
        return Err(ProtocolError::FrameTooShort {
            expected: 3,
            actual: payload.len(),
        });
    }

    let severity = MessageSeverity::from(payload[0]);
    let duration_ms = u16::from_le_bytes([payload[1], payload[2]]);
    let message = std::str::from_utf8(&payload[3..])
        .map_err(|_| ProtocolError::InvalidUtf8)?
        .to_string();

    Ok(DeviceEvent::DisplayMessage {
        message,
        severity,
        duration_ms,
    })
}

/// Read a zero-padded fixed-width string field.
fn read_padded_str(field: &[u8]) -> Result<String, ProtocolError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end])
        .map(|s| s.to_string())
        .map_err(|_| ProtocolError::InvalidUtf8)
}

/// Read a NUL-terminated string, returning it and the remaining bytes.
fn read_nul_str(data: &[u8]) -> Result<(String, &[u8]), ProtocolError> {
    let end = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ProtocolError::InvalidData("unterminated string field".to_string()))?;
    let s = std::str::from_utf8(&data[..end]).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok((s.to_string(), &data[end + 1..]))
}
