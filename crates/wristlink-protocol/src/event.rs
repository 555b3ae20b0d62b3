//! Typed device events.
//!
//! Every notification coming up from the device is classified into exactly
//! one [`DeviceEvent`] variant. The dispatcher matches over the full set, so
//! adding a variant here forces every dispatch site to handle it.

use uuid::Uuid;

use crate::constants::*;
use crate::dict::TupleValue;
use crate::error::ProtocolError;

/// A typed notification originating from the device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Firmware and hardware version report.
    VersionInfo {
        /// Firmware version string.
        firmware_version: String,
        /// Hardware model string.
        hardware_model: String,
    },

    /// Installed application inventory.
    AppInfo {
        /// Installed apps, in device order.
        apps: Vec<AppEntry>,
    },

    /// Result window from the on-device sleep monitor.
    SleepMonitorResult {
        /// Start of the smart alarm window (unix seconds).
        window_start: u32,
        /// End of the smart alarm window (unix seconds).
        window_end: u32,
        /// Base timestamp of the recording (unix seconds).
        base_timestamp: u32,
        /// Whether the alarm fired inside the window.
        alarm_fired: bool,
    },

    /// A notification lifecycle action taken on the device.
    NotificationControl {
        /// The requested action.
        action: NotificationAction,
        /// Opaque handle correlating the action with a host notification.
        handle: u32,
        /// Phone number attached by the device, if any.
        phone_number: Option<String>,
        /// Reply text, for [`NotificationAction::Reply`].
        reply: Option<String>,
    },

    /// Battery state report.
    BatteryInfo {
        /// Charge level, 0-100.
        level_percent: u8,
        /// Charging state.
        state: BatteryState,
        /// Time of the last full charge (unix seconds), if reported.
        last_charge_time: Option<u32>,
        /// Number of charge cycles, if reported.
        charge_cycles: Option<u32>,
    },

    /// Find-phone signaling.
    FindPhone {
        /// Whether the search is starting or stopping.
        phase: FindPhonePhase,
    },

    /// Transient message the host should surface to the user.
    DisplayMessage {
        /// Message text.
        message: String,
        /// Message severity.
        severity: MessageSeverity,
        /// Suggested display duration in milliseconds.
        duration_ms: u16,
    },

    /// Raw payload that must go back out on the wire (app acks, weather
    /// pushes, start commands).
    SendBytes {
        /// Destination endpoint.
        endpoint: u16,
        /// Payload bytes.
        data: Vec<u8>,
    },

    /// An inbound app message after manifest resolution.
    AppMessage {
        /// Owning application uuid.
        uuid: Uuid,
        /// Resolved key/value fields. Unresolvable keys are omitted.
        fields: Vec<AppField>,
    },

    /// A complete record assembled from a data log session.
    DatalogRecord {
        /// Owning application uuid.
        uuid: Uuid,
        /// Session log tag.
        tag: u32,
        /// Record bytes, exactly one item.
        data: Vec<u8>,
    },
}

/// One installed application, as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// Application uuid.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// Creator / vendor name.
    pub creator: String,
    /// Application kind.
    pub kind: AppKind,
}

/// Application kind reported in the app inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    /// Generic third-party app.
    Generic,
    /// Activity tracker.
    ActivityTracker,
    /// Third-party watch face.
    Watchface,
    /// Built-in system app.
    SystemApp,
    /// Built-in system watch face.
    SystemWatchface,
}

impl TryFrom<u8> for AppKind {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            APP_KIND_GENERIC => Ok(AppKind::Generic),
            APP_KIND_ACTIVITY_TRACKER => Ok(AppKind::ActivityTracker),
            APP_KIND_WATCHFACE => Ok(AppKind::Watchface),
            APP_KIND_SYSTEM_APP => Ok(AppKind::SystemApp),
            APP_KIND_SYSTEM_WATCHFACE => Ok(AppKind::SystemWatchface),
            _ => Err(ProtocolError::InvalidData(format!(
                "unknown app kind: {}",
                value
            ))),
        }
    }
}

impl From<AppKind> for u8 {
    fn from(value: AppKind) -> Self {
        match value {
            AppKind::Generic => APP_KIND_GENERIC,
            AppKind::ActivityTracker => APP_KIND_ACTIVITY_TRACKER,
            AppKind::Watchface => APP_KIND_WATCHFACE,
            AppKind::SystemApp => APP_KIND_SYSTEM_APP,
            AppKind::SystemWatchface => APP_KIND_SYSTEM_WATCHFACE,
        }
    }
}

/// Battery charging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryState {
    /// State unknown or not reported.
    Unknown,
    /// Device is charging.
    Charging,
    /// Battery is low.
    Low,
    /// Battery is in the normal range.
    Normal,
}

impl From<u8> for BatteryState {
    fn from(value: u8) -> Self {
        match value {
            BATTERY_STATE_CHARGING => BatteryState::Charging,
            BATTERY_STATE_LOW => BatteryState::Low,
            BATTERY_STATE_NORMAL => BatteryState::Normal,
            _ => BatteryState::Unknown,
        }
    }
}

impl From<BatteryState> for u8 {
    fn from(value: BatteryState) -> Self {
        match value {
            BatteryState::Unknown => BATTERY_STATE_UNKNOWN,
            BatteryState::Charging => BATTERY_STATE_CHARGING,
            BatteryState::Low => BATTERY_STATE_LOW,
            BatteryState::Normal => BATTERY_STATE_NORMAL,
        }
    }
}

/// Notification lifecycle action requested by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Dismiss one notification.
    Dismiss,
    /// Dismiss all notifications.
    DismissAll,
    /// Open the originating notification on the host.
    Open,
    /// Mute the originating app.
    Mute,
    /// Reply with attached text.
    Reply,
}

impl TryFrom<u8> for NotificationAction {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            NOTIFICATION_ACTION_DISMISS => Ok(NotificationAction::Dismiss),
            NOTIFICATION_ACTION_DISMISS_ALL => Ok(NotificationAction::DismissAll),
            NOTIFICATION_ACTION_OPEN => Ok(NotificationAction::Open),
            NOTIFICATION_ACTION_MUTE => Ok(NotificationAction::Mute),
            NOTIFICATION_ACTION_REPLY => Ok(NotificationAction::Reply),
            _ => Err(ProtocolError::InvalidData(format!(
                "unknown notification action: 0x{:02X}",
                value
            ))),
        }
    }
}

/// Whether find-phone is starting or stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindPhonePhase {
    /// The device asked the phone to start ringing.
    Start,
    /// The device was found; stop ringing.
    Stop,
}

/// Severity of a transient display message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    /// Informational.
    Info,
    /// Warning.
    Warning,
    /// Error.
    Error,
    /// Unknown severity value.
    Unknown(u8),
}

impl From<u8> for MessageSeverity {
    fn from(value: u8) -> Self {
        match value {
            SEVERITY_INFO => MessageSeverity::Info,
            SEVERITY_WARNING => MessageSeverity::Warning,
            SEVERITY_ERROR => MessageSeverity::Error,
            _ => MessageSeverity::Unknown(value),
        }
    }
}

/// One manifest-resolved key/value field of an app message.
#[derive(Debug, Clone, PartialEq)]
pub struct AppField {
    /// Symbolic key name from the app's key manifest.
    pub name: String,
    /// Field value.
    pub value: TupleValue,
}

impl AppField {
    /// Create a new field.
    pub fn new(name: impl Into<String>, value: TupleValue) -> Self {
        AppField {
            name: name.into(),
            value,
        }
    }
}
