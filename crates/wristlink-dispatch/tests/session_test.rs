//! End-to-end session tests: raw frames in, host signals and transport
//! traffic out.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use wristlink_apps::{CodecRegistry, HealthifyCodec};
use wristlink_dispatch::{
    DeviceConfig, DeviceRecord, DeviceSession, DispatchError, Dispatcher, HostSignal,
    IdentityLookup, ReplyTransport, SignalBus, TransportSink,
};
use wristlink_manifest::{KeyManifest, MemoryManifestStore};
use wristlink_protocol::{
    encode_ack, encode_push, AppMessageFrame, BatteryState, NotificationAction, Tuple, TupleValue,
    BATTERY_STATE_CHARGING, BATTERY_STATE_NORMAL, DATALOG_DATA, DATALOG_ITEM_BYTES, DATALOG_OPEN,
    ENDPOINT_APP_LAUNCH, ENDPOINT_APP_MESSAGE, ENDPOINT_BATTERY, ENDPOINT_DATALOG,
    ENDPOINT_NOTIFICATION_ACTION, ENDPOINT_PHONE_CONTROL, ENDPOINT_VERSION,
    NOTIFICATION_ACTION_REPLY, PHONE_CONTROL_RING_START, VERSION_FW_FIELD_LEN,
    VERSION_HW_FIELD_LEN,
};

// ============================================================================
// Collaborator Mocks
// ============================================================================

#[derive(Clone, Default)]
struct RecordingTransport {
    frames: Arc<Mutex<Vec<(u16, Vec<u8>)>>>,
}

impl RecordingTransport {
    fn frames(&self) -> Vec<(u16, Vec<u8>)> {
        self.frames.lock().unwrap().clone()
    }
}

impl TransportSink for RecordingTransport {
    fn send(&self, endpoint: u16, payload: &[u8]) {
        self.frames.lock().unwrap().push((endpoint, payload.to_vec()));
    }
}

#[derive(Clone, Default)]
struct RecordingReplies {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingReplies {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl ReplyTransport for RecordingReplies {
    fn send_reply(&self, phone_number: &str, text: &str) -> Result<(), DispatchError> {
        if self.fail {
            return Err(DispatchError::ReplyDelivery("radio unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((phone_number.to_string(), text.to_string()));
        Ok(())
    }
}

struct MapLookup(HashMap<u32, String>);

impl IdentityLookup for MapLookup {
    fn lookup(&self, handle: u32) -> Option<String> {
        self.0.get(&handle).cloned()
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    session: DeviceSession,
    signals: Receiver<HostSignal>,
    transport: RecordingTransport,
    replies: RecordingReplies,
}

fn harness(config: DeviceConfig, lookup: HashMap<u32, String>, registry: CodecRegistry) -> Harness {
    let (bus, signals) = SignalBus::new();
    let transport = RecordingTransport::default();
    let replies = RecordingReplies::default();

    let dispatcher = Dispatcher::new(
        DeviceRecord::new("Test Watch"),
        config,
        bus,
        Box::new(MapLookup(lookup)),
        Box::new(replies.clone()),
        Box::new(transport.clone()),
    );

    Harness {
        session: DeviceSession::new(dispatcher, registry),
        signals,
        transport,
        replies,
    }
}

fn drain(signals: &Receiver<HostSignal>) -> Vec<HostSignal> {
    signals.try_iter().collect()
}

fn healthify_registry() -> CodecRegistry {
    let mut keys = HashMap::new();
    keys.insert("TEMPERATURE".to_string(), 0u32);
    keys.insert("CONDITIONS".to_string(), 1u32);

    let mut store = MemoryManifestStore::new();
    store.insert(KeyManifest::new(HealthifyCodec::APP_UUID, keys));

    let mut registry = CodecRegistry::new();
    registry.register(Box::new(HealthifyCodec::new(
        HealthifyCodec::APP_UUID,
        &store,
    )));
    registry
}

// ============================================================================
// Frame Builders
// ============================================================================

fn version_frame(firmware: &str, model: &str) -> Vec<u8> {
    let mut payload = vec![0u8; VERSION_FW_FIELD_LEN + VERSION_HW_FIELD_LEN];
    payload[..firmware.len()].copy_from_slice(firmware.as_bytes());
    payload[VERSION_FW_FIELD_LEN..VERSION_FW_FIELD_LEN + model.len()]
        .copy_from_slice(model.as_bytes());
    payload
}

fn battery_frame(level: u8, state: u8) -> Vec<u8> {
    vec![level, state, 0]
}

fn reply_frame(handle: u32, number: Option<&str>, reply: &str) -> Vec<u8> {
    let mut payload = vec![NOTIFICATION_ACTION_REPLY];
    payload.extend_from_slice(&handle.to_le_bytes());
    let mut flags = 0x02u8;
    if number.is_some() {
        flags |= 0x01;
    }
    payload.push(flags);
    if let Some(number) = number {
        payload.extend_from_slice(number.as_bytes());
        payload.push(0);
    }
    payload.extend_from_slice(reply.as_bytes());
    payload.push(0);
    payload
}

fn datalog_open_frame(id: u8, uuid: Uuid, tag: u32, item_size: u16) -> Vec<u8> {
    let mut frame = vec![DATALOG_OPEN, id];
    frame.extend_from_slice(uuid.as_bytes());
    frame.extend_from_slice(&1_700_000_000u32.to_le_bytes());
    frame.extend_from_slice(&tag.to_le_bytes());
    frame.push(DATALOG_ITEM_BYTES);
    frame.extend_from_slice(&item_size.to_le_bytes());
    frame
}

fn datalog_data_frame(id: u8, chunk: &[u8]) -> Vec<u8> {
    let mut frame = vec![DATALOG_DATA, id];
    frame.extend_from_slice(&0u32.to_le_bytes());
    frame.extend_from_slice(chunk);
    frame
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_version_frame_updates_device_record() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), CodecRegistry::new());

    h.session
        .handle_frame(ENDPOINT_VERSION, &version_frame("v4.3", "basalt"));

    assert_eq!(drain(&h.signals), vec![HostSignal::DeviceInfoChanged]);
    assert_eq!(h.session.device().firmware_version.as_deref(), Some("v4.3"));
    assert_eq!(h.session.device().hardware_model.as_deref(), Some("basalt"));
}

#[test]
fn test_low_battery_raised_only_when_not_charging() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), CodecRegistry::new());

    // Below threshold and Normal: the notice is raised.
    h.session
        .handle_frame(ENDPOINT_BATTERY, &battery_frame(5, BATTERY_STATE_NORMAL));
    let signals = drain(&h.signals);
    assert!(matches!(
        signals[0],
        HostSignal::LowBatteryRaised { level_percent: 5, .. }
    ));
    assert_eq!(signals[1], HostSignal::DeviceInfoChanged);

    // Same level while charging: the notice is cleared, never raised.
    h.session
        .handle_frame(ENDPOINT_BATTERY, &battery_frame(5, BATTERY_STATE_CHARGING));
    let signals = drain(&h.signals);
    assert_eq!(signals[0], HostSignal::LowBatteryCleared);
    assert_eq!(signals[1], HostSignal::DeviceInfoChanged);
    assert_eq!(h.session.device().battery_state, BatteryState::Charging);
    assert_eq!(h.session.device().battery_level, Some(5));
}

#[test]
fn test_reply_with_successful_lookup_submits_with_suffix() {
    let config = DeviceConfig {
        reply_suffix: Some(" - Sent from my watch".to_string()),
        ..DeviceConfig::default()
    };
    let mut lookup = HashMap::new();
    lookup.insert(99u32, "+491701234567".to_string());
    let mut h = harness(config, lookup, CodecRegistry::new());

    h.session.handle_frame(
        ENDPOINT_NOTIFICATION_ACTION,
        &reply_frame(99, None, "On my way"),
    );

    assert_eq!(
        h.replies.sent(),
        vec![(
            "+491701234567".to_string(),
            "On my way - Sent from my watch".to_string()
        )]
    );
    assert_eq!(
        drain(&h.signals),
        vec![HostSignal::ReplyDelivered {
            phone_number: "+491701234567".to_string()
        }]
    );
}

#[test]
fn test_reply_with_failed_lookup_falls_back_to_host() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), CodecRegistry::new());

    h.session.handle_frame(
        ENDPOINT_NOTIFICATION_ACTION,
        &reply_frame(42, None, "On my way"),
    );

    assert!(h.replies.sent().is_empty());
    assert_eq!(
        drain(&h.signals),
        vec![HostSignal::NotificationAction {
            action: NotificationAction::Reply,
            handle: 42,
            reply: Some("On my way".to_string()),
        }]
    );
}

#[test]
fn test_empty_suffix_is_not_appended() {
    let config = DeviceConfig {
        reply_suffix: Some(String::new()),
        ..DeviceConfig::default()
    };
    let mut lookup = HashMap::new();
    lookup.insert(7u32, "+15550000".to_string());
    let mut h = harness(config, lookup, CodecRegistry::new());

    h.session
        .handle_frame(ENDPOINT_NOTIFICATION_ACTION, &reply_frame(7, None, "ok"));

    assert_eq!(
        h.replies.sent(),
        vec![("+15550000".to_string(), "ok".to_string())]
    );
}

#[test]
fn test_reply_submission_failure_is_swallowed() {
    let (bus, signals) = SignalBus::new();
    let transport = RecordingTransport::default();
    let replies = RecordingReplies {
        sent: Arc::default(),
        fail: true,
    };
    let mut lookup = HashMap::new();
    lookup.insert(3u32, "+15552222".to_string());

    let dispatcher = Dispatcher::new(
        DeviceRecord::new("Test Watch"),
        DeviceConfig::default(),
        bus,
        Box::new(MapLookup(lookup)),
        Box::new(replies.clone()),
        Box::new(transport.clone()),
    );
    let mut session = DeviceSession::new(dispatcher, CodecRegistry::new());

    session.handle_frame(ENDPOINT_NOTIFICATION_ACTION, &reply_frame(3, None, "hi"));

    // The failure surfaces as a signal, not a crash or a retry.
    assert_eq!(
        drain(&signals),
        vec![HostSignal::ReplyFailed {
            phone_number: "+15552222".to_string()
        }]
    );
    assert!(replies.sent().is_empty());
}

#[test]
fn test_attached_number_skips_lookup() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), CodecRegistry::new());

    h.session.handle_frame(
        ENDPOINT_NOTIFICATION_ACTION,
        &reply_frame(1, Some("+15551111"), "yes"),
    );

    assert_eq!(
        h.replies.sent(),
        vec![("+15551111".to_string(), "yes".to_string())]
    );
}

#[test]
fn test_app_message_push_is_acked_and_resolved() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), healthify_registry());

    let tuples = [
        Tuple::new(0, TupleValue::Int(19)),
        Tuple::new(777, TupleValue::Uint(1)), // unknown key, ignored
    ];
    let push = encode_push(3, HealthifyCodec::APP_UUID, &tuples).unwrap();
    h.session.handle_frame(ENDPOINT_APP_MESSAGE, &push);

    // The push was acknowledged on the wire.
    let frames = h.transport.frames();
    assert_eq!(frames, vec![(ENDPOINT_APP_MESSAGE, encode_ack(3))]);

    // Only the resolvable field survives; no failure anywhere.
    let signals = drain(&h.signals);
    assert_eq!(signals.len(), 1);
    match &signals[0] {
        HostSignal::AppMessageReceived { uuid, fields } => {
            assert_eq!(*uuid, HealthifyCodec::APP_UUID);
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].name, "TEMPERATURE");
            assert_eq!(fields[0].value, TupleValue::Int(19));
        }
        other => panic!("unexpected signal: {:?}", other),
    }
}

#[test]
fn test_sleep_datalog_session_produces_sleep_signal() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), CodecRegistry::new());
    let uuid = Uuid::from_u128(7);

    h.session
        .handle_frame(ENDPOINT_DATALOG, &datalog_open_frame(1, uuid, 83, 13));

    let mut item = Vec::new();
    item.extend_from_slice(&1000u32.to_le_bytes());
    item.extend_from_slice(&2000u32.to_le_bytes());
    item.extend_from_slice(&500u32.to_le_bytes());
    item.push(1);
    h.session
        .handle_frame(ENDPOINT_DATALOG, &datalog_data_frame(1, &item));

    let signals = drain(&h.signals);
    assert_eq!(
        signals,
        vec![HostSignal::SleepDataReady {
            window_start: 1000,
            window_end: 2000,
            base_timestamp: 500,
            alarm_fired: true,
        }]
    );

    // Both datalog messages were acknowledged.
    let frames = h.transport.frames();
    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|(endpoint, _)| *endpoint == ENDPOINT_DATALOG));
}

#[test]
fn test_find_phone_frame_opens_surface() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), CodecRegistry::new());

    h.session
        .handle_frame(ENDPOINT_PHONE_CONTROL, &[PHONE_CONTROL_RING_START]);
    assert_eq!(drain(&h.signals), vec![HostSignal::OpenFindPhone]);
}

#[test]
fn test_start_app_sends_launch_frame() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), healthify_registry());

    h.session.start_app(HealthifyCodec::APP_UUID);

    let frames = h.transport.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, ENDPOINT_APP_LAUNCH);
    assert!(AppMessageFrame::decode(&frames[0].1).is_ok());
}

#[test]
fn test_send_key_values_round_trips_through_device() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), healthify_registry());

    h.session
        .send_key_values(
            HealthifyCodec::APP_UUID,
            &[("TEMPERATURE", TupleValue::Int(23))],
        )
        .unwrap();

    // Feed the encoded frame back in as if the device echoed it: the
    // semantic fields come out unchanged.
    let frames = h.transport.frames();
    let (endpoint, payload) = &frames[0];
    h.session.handle_frame(*endpoint, payload);

    let signals = drain(&h.signals);
    match &signals[0] {
        HostSignal::AppMessageReceived { fields, .. } => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].name, "TEMPERATURE");
            assert_eq!(fields[0].value, TupleValue::Int(23));
        }
        other => panic!("unexpected signal: {:?}", other),
    }
}

#[test]
fn test_malformed_frame_is_swallowed() {
    let mut h = harness(DeviceConfig::default(), HashMap::new(), CodecRegistry::new());

    // Truncated battery report and an unknown endpoint: both dropped, the
    // session keeps running.
    h.session.handle_frame(ENDPOINT_BATTERY, &[50]);
    h.session.handle_frame(4242, &[1, 2, 3]);
    assert!(drain(&h.signals).is_empty());

    h.session
        .handle_frame(ENDPOINT_BATTERY, &battery_frame(80, BATTERY_STATE_NORMAL));
    let signals = drain(&h.signals);
    assert_eq!(signals[0], HostSignal::LowBatteryCleared);
    assert_eq!(signals[1], HostSignal::DeviceInfoChanged);
}
