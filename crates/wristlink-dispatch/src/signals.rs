//! Host signals.
//!
//! The dispatcher never talks to UI, storage, or telephony directly; it
//! publishes signals on an outbound channel owned by the host. Emission is
//! fire-and-forget: a host that has hung up its receiver loses signals with
//! a warning, nothing more.

use std::sync::mpsc;

use tracing::warn;
use uuid::Uuid;

use wristlink_protocol::{AppEntry, AppField, MessageSeverity, NotificationAction};

/// A host-side signal published by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum HostSignal {
    /// The device record changed (version, battery, model).
    DeviceInfoChanged,

    /// The installed-app inventory changed.
    AppListChanged {
        /// Installed apps, in device order.
        apps: Vec<AppEntry>,
    },

    /// Sleep monitor data is ready for charting.
    SleepDataReady {
        /// Start of the smart alarm window (unix seconds).
        window_start: u32,
        /// End of the smart alarm window (unix seconds).
        window_end: u32,
        /// Base timestamp of the recording (unix seconds).
        base_timestamp: u32,
        /// Whether the alarm fired inside the window.
        alarm_fired: bool,
    },

    /// A notification lifecycle action to apply on the host.
    NotificationAction {
        /// The requested action.
        action: NotificationAction,
        /// Handle of the originating notification.
        handle: u32,
        /// Reply text, for reply actions that fall back to the host.
        reply: Option<String>,
    },

    /// The low-battery notice should be shown or refreshed.
    LowBatteryRaised {
        /// Battery level percentage.
        level_percent: u8,
        /// Pre-formatted notice text.
        message: String,
    },

    /// The low-battery notice should be removed.
    LowBatteryCleared,

    /// A locate-phone surface should open.
    OpenFindPhone,

    /// The phone was found; stop signaling.
    PhoneFound,

    /// A transient message to surface to the user.
    DisplayMessage {
        /// Message text.
        message: String,
        /// Message severity.
        severity: MessageSeverity,
        /// Suggested display duration in milliseconds.
        duration_ms: u16,
    },

    /// An outbound reply was submitted for delivery.
    ReplyDelivered {
        /// Recipient phone number.
        phone_number: String,
    },

    /// An outbound reply could not be submitted.
    ReplyFailed {
        /// Recipient phone number.
        phone_number: String,
    },

    /// An app message arrived and was resolved through its manifest.
    AppMessageReceived {
        /// Owning application uuid.
        uuid: Uuid,
        /// Resolved fields.
        fields: Vec<AppField>,
    },

    /// A data log record was assembled.
    DatalogReady {
        /// Owning application uuid.
        uuid: Uuid,
        /// Session log tag.
        tag: u32,
        /// Record bytes.
        data: Vec<u8>,
    },
}

/// Sending half of the host signal channel.
#[derive(Clone)]
pub struct SignalBus {
    sender: mpsc::Sender<HostSignal>,
}

impl SignalBus {
    /// Create a bus and the receiving half the host consumes.
    pub fn new() -> (Self, mpsc::Receiver<HostSignal>) {
        let (sender, receiver) = mpsc::channel();
        (SignalBus { sender }, receiver)
    }

    /// Wrap an existing sender.
    pub fn from_sender(sender: mpsc::Sender<HostSignal>) -> Self {
        SignalBus { sender }
    }

    /// Publish a signal. Fire-and-forget: a disconnected receiver is
    /// logged, not an error.
    pub fn emit(&self, signal: HostSignal) {
        if self.sender.send(signal).is_err() {
            warn!("host signal dropped: receiver disconnected");
        }
    }
}
