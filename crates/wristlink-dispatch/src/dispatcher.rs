//! The device event dispatcher.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use wristlink_protocol::{BatteryState, DeviceEvent, FindPhonePhase, NotificationAction};

use crate::config::DeviceConfig;
use crate::device::DeviceRecord;
use crate::signals::{HostSignal, SignalBus};
use crate::traits::{IdentityLookup, ReplyTransport, TransportSink};

/// Consumes device events one at a time and executes the corresponding
/// host-side action.
///
/// The match in [`dispatch`](Dispatcher::dispatch) is exhaustive over the
/// closed event union: adding an event variant is a compile error here
/// until a handler exists, which is the dispatcher's core correctness
/// property.
pub struct Dispatcher {
    device: DeviceRecord,
    config: DeviceConfig,
    signals: SignalBus,
    identity: Box<dyn IdentityLookup>,
    replies: Box<dyn ReplyTransport>,
    transport: Box<dyn TransportSink>,
}

impl Dispatcher {
    /// Create a dispatcher for one device.
    pub fn new(
        device: DeviceRecord,
        config: DeviceConfig,
        signals: SignalBus,
        identity: Box<dyn IdentityLookup>,
        replies: Box<dyn ReplyTransport>,
        transport: Box<dyn TransportSink>,
    ) -> Self {
        Dispatcher {
            device,
            config,
            signals,
            identity,
            replies,
            transport,
        }
    }

    /// The device record this dispatcher maintains.
    pub fn device(&self) -> &DeviceRecord {
        &self.device
    }

    /// Handle one event to completion.
    pub fn dispatch(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::VersionInfo {
                firmware_version,
                hardware_model,
            } => self.handle_version_info(firmware_version, hardware_model),

            DeviceEvent::AppInfo { apps } => {
                info!("app inventory with {} entries", apps.len());
                self.signals.emit(HostSignal::AppListChanged { apps });
            }

            DeviceEvent::SleepMonitorResult {
                window_start,
                window_end,
                base_timestamp,
                alarm_fired,
            } => {
                info!("sleep monitor result, alarm_fired={}", alarm_fired);
                self.signals.emit(HostSignal::SleepDataReady {
                    window_start,
                    window_end,
                    base_timestamp,
                    alarm_fired,
                });
            }

            DeviceEvent::NotificationControl {
                action,
                handle,
                phone_number,
                reply,
            } => self.handle_notification_control(action, handle, phone_number, reply),

            DeviceEvent::BatteryInfo {
                level_percent,
                state,
                last_charge_time,
                charge_cycles,
            } => self.handle_battery_info(level_percent, state, last_charge_time, charge_cycles),

            DeviceEvent::FindPhone { phase } => match phase {
                FindPhonePhase::Start => {
                    info!("find phone started");
                    self.signals.emit(HostSignal::OpenFindPhone);
                }
                FindPhonePhase::Stop => {
                    info!("find phone stopped");
                    self.signals.emit(HostSignal::PhoneFound);
                }
            },

            DeviceEvent::DisplayMessage {
                message,
                severity,
                duration_ms,
            } => {
                self.signals.emit(HostSignal::DisplayMessage {
                    message,
                    severity,
                    duration_ms,
                });
            }

            DeviceEvent::SendBytes { endpoint, data } => {
                debug!("sending {} bytes to endpoint {}", data.len(), endpoint);
                self.transport.send(endpoint, &data);
            }

            DeviceEvent::AppMessage { uuid, fields } => {
                debug!("app message from {} with {} fields", uuid, fields.len());
                self.signals
                    .emit(HostSignal::AppMessageReceived { uuid, fields });
            }

            DeviceEvent::DatalogRecord { uuid, tag, data } => {
                self.signals.emit(HostSignal::DatalogReady { uuid, tag, data });
            }
        }
    }

    fn handle_version_info(&mut self, firmware_version: String, hardware_model: String) {
        info!(
            "device version: firmware {}, model {}",
            firmware_version, hardware_model
        );
        self.device.firmware_version = Some(firmware_version);
        self.device.hardware_model = Some(hardware_model);
        self.signals.emit(HostSignal::DeviceInfoChanged);
    }

    fn handle_notification_control(
        &mut self,
        action: NotificationAction,
        handle: u32,
        phone_number: Option<String>,
        reply: Option<String>,
    ) {
        if action != NotificationAction::Reply {
            self.signals.emit(HostSignal::NotificationAction {
                action,
                handle,
                reply: None,
            });
            return;
        }

        // The configured suffix rides along on every reply path.
        let mut text = reply.unwrap_or_default();
        match &self.config.reply_suffix {
            Some(suffix) if !suffix.is_empty() => text.push_str(suffix),
            _ => {}
        }

        let number = phone_number.or_else(|| self.identity.lookup(handle));
        match number {
            Some(number) => {
                info!("submitting reply to {}", number);
                match self.replies.send_reply(&number, &text) {
                    Ok(()) => self.signals.emit(HostSignal::ReplyDelivered {
                        phone_number: number,
                    }),
                    Err(e) => {
                        warn!("reply to {} failed: {}", number, e);
                        self.signals.emit(HostSignal::ReplyFailed {
                            phone_number: number,
                        });
                    }
                }
            }
            None => {
                // No number attached and no identity found: fall back to a
                // generic host-side reply against the raw handle.
                info!("reply for handle {} falls back to the host", handle);
                self.signals.emit(HostSignal::NotificationAction {
                    action,
                    handle,
                    reply: Some(text),
                });
            }
        }
    }

    fn handle_battery_info(
        &mut self,
        level_percent: u8,
        state: BatteryState,
        last_charge_time: Option<u32>,
        charge_cycles: Option<u32>,
    ) {
        self.device.battery_level = Some(level_percent);
        self.device.battery_state = state;
        self.device.last_charge_time = last_charge_time;
        self.device.charge_cycles = charge_cycles;

        // A charging device below threshold must not alert.
        let below_threshold = level_percent <= self.config.battery_threshold_percent;
        let alertable = matches!(state, BatteryState::Low | BatteryState::Normal);
        if below_threshold && alertable {
            let message = self.low_battery_message(level_percent, last_charge_time, charge_cycles);
            self.signals.emit(HostSignal::LowBatteryRaised {
                level_percent,
                message,
            });
        } else {
            self.signals.emit(HostSignal::LowBatteryCleared);
        }

        self.signals.emit(HostSignal::DeviceInfoChanged);
    }

    fn low_battery_message(
        &self,
        level_percent: u8,
        last_charge_time: Option<u32>,
        charge_cycles: Option<u32>,
    ) -> String {
        let mut message = format!("{} battery low: {}%", self.device.name, level_percent);
        if let Some(ts) = last_charge_time {
            if let Some(when) = DateTime::<Utc>::from_timestamp(i64::from(ts), 0) {
                message.push_str(&format!(
                    "\nLast charge: {}",
                    when.format("%Y-%m-%d %H:%M")
                ));
            }
        }
        if let Some(cycles) = charge_cycles {
            message.push_str(&format!("\nCharge cycles: {}", cycles));
        }
        message
    }
}
