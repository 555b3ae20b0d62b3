//! The per-device session front door.

use tracing::{debug, trace, warn};
use uuid::Uuid;

use wristlink_apps::{CodecError, CodecRegistry, WeatherUpdate};
use wristlink_datalog::DatalogTracker;
use wristlink_protocol::{
    decode_system_message, encode_ack, AppMessageFrame, DeviceEvent, ProtocolError, TupleValue,
    ENDPOINT_APP_MESSAGE, ENDPOINT_DATALOG,
};

use crate::dispatcher::Dispatcher;

/// One connected device: codec registry, data log tracker, and dispatcher.
///
/// `handle_frame` takes `&mut self`, which serializes event handling per
/// device; independent devices are independent sessions and may run
/// concurrently.
pub struct DeviceSession {
    dispatcher: Dispatcher,
    registry: CodecRegistry,
    datalog: DatalogTracker,
}

impl DeviceSession {
    /// Create a session from a dispatcher and a populated codec registry.
    pub fn new(dispatcher: Dispatcher, registry: CodecRegistry) -> Self {
        DeviceSession {
            dispatcher,
            registry,
            datalog: DatalogTracker::new(),
        }
    }

    /// The dispatcher's device record.
    pub fn device(&self) -> &crate::device::DeviceRecord {
        self.dispatcher.device()
    }

    /// Handle one inbound frame.
    ///
    /// Every produced event is dispatched to completion before this method
    /// returns. Decode failures never escape: they are logged and the frame
    /// is dropped.
    pub fn handle_frame(&mut self, endpoint: u16, payload: &[u8]) {
        let events = match endpoint {
            ENDPOINT_APP_MESSAGE => match self.decode_app_message(payload) {
                Ok(events) => events,
                Err(e) => {
                    warn!("dropping app message frame: {}", e);
                    return;
                }
            },
            ENDPOINT_DATALOG => match self.datalog.handle_message(payload) {
                Ok(events) => events,
                Err(e) => {
                    warn!("dropping data log frame: {}", e);
                    return;
                }
            },
            _ => match decode_system_message(endpoint, payload) {
                Ok(event) => vec![event],
                Err(e) => {
                    warn!("dropping frame for endpoint {}: {}", endpoint, e);
                    return;
                }
            },
        };

        for event in events {
            self.dispatcher.dispatch(event);
        }
    }

    /// Ask the device to start running an app.
    pub fn start_app(&mut self, uuid: Uuid) {
        let (endpoint, data) = self.registry.start_app(uuid);
        self.dispatcher.dispatch(DeviceEvent::SendBytes { endpoint, data });
    }

    /// Send a named key/value set to an app.
    ///
    /// Fails closed if the app is unknown or any name does not resolve; no
    /// partial command is sent.
    pub fn send_key_values(
        &mut self,
        uuid: Uuid,
        fields: &[(&str, TupleValue)],
    ) -> Result<(), CodecError> {
        let (endpoint, data) = self.registry.send_key_values(uuid, fields)?;
        self.dispatcher.dispatch(DeviceEvent::SendBytes { endpoint, data });
        Ok(())
    }

    /// Push a weather update to an app that displays weather.
    ///
    /// Returns false when the app has no codec, no weather keys, or a
    /// degraded manifest.
    pub fn push_weather_update(&mut self, uuid: Uuid, weather: &WeatherUpdate) -> bool {
        match self.registry.encode_weather_update(uuid, weather) {
            Some(data) => {
                self.dispatcher.dispatch(DeviceEvent::SendBytes {
                    endpoint: ENDPOINT_APP_MESSAGE,
                    data,
                });
                true
            }
            None => false,
        }
    }

    /// Handle transport teardown: open data log sessions close and partial
    /// items are discarded.
    pub fn handle_disconnect(&mut self) {
        debug!("transport disconnected, closing data log sessions");
        self.datalog.close_all();
    }

    fn decode_app_message(&self, payload: &[u8]) -> Result<Vec<DeviceEvent>, ProtocolError> {
        match AppMessageFrame::decode(payload)? {
            AppMessageFrame::Push {
                transaction_id,
                uuid,
                tuples,
            } => {
                // Every push is acknowledged, registered codec or not.
                let mut events = vec![DeviceEvent::SendBytes {
                    endpoint: ENDPOINT_APP_MESSAGE,
                    data: encode_ack(transaction_id),
                }];
                match self.registry.decode(uuid, &tuples) {
                    Some(decoded) => events.extend(decoded),
                    None => debug!("push from app {} with no registered codec", uuid),
                }
                Ok(events)
            }

            AppMessageFrame::Request {
                transaction_id,
                uuid,
            } => {
                // State pushes are host-driven; acknowledge and move on.
                debug!("state request from app {}", uuid);
                Ok(vec![DeviceEvent::SendBytes {
                    endpoint: ENDPOINT_APP_MESSAGE,
                    data: encode_ack(transaction_id),
                }])
            }

            AppMessageFrame::Ack { transaction_id } => {
                trace!("push {} acknowledged", transaction_id);
                Ok(Vec::new())
            }

            AppMessageFrame::Nack { transaction_id } => {
                debug!("push {} rejected by device", transaction_id);
                Ok(Vec::new())
            }
        }
    }
}
