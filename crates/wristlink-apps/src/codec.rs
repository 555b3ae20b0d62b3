//! The codec abstraction and registry.

use std::collections::HashMap;

use uuid::Uuid;

use wristlink_manifest::KeyManifest;
use wristlink_protocol::{
    encode_app_launch, encode_push, AppField, DeviceEvent, Tuple, TupleValue,
    ENDPOINT_APP_LAUNCH, ENDPOINT_APP_MESSAGE,
};

use crate::error::CodecError;
use crate::weather::WeatherUpdate;

/// Translates between an application's raw key/value dictionaries and
/// semantic device events.
///
/// One implementor exists per supported third-party watch app; instances
/// are selected by uuid at registration time and own their resolved key
/// manifest. Decode and encode are pure; a codec holds no mutable state
/// after construction.
pub trait AppMessageCodec {
    /// The application this codec speaks for.
    fn uuid(&self) -> Uuid;

    /// The codec's resolved key manifest, if the manifest loaded.
    fn manifest(&self) -> Option<&KeyManifest>;

    /// Decode an inbound dictionary into device events.
    ///
    /// Keys that do not resolve through the manifest are ignored: future
    /// app versions may add keys this codec does not understand.
    fn decode(&self, tuples: &[Tuple]) -> Vec<DeviceEvent>;

    /// Encode the payload that asks the device to start running this app.
    ///
    /// Codecs with no special startup payload return the plain launch
    /// request; the result is always a well-formed command.
    fn encode_start_command(&self) -> Vec<u8> {
        encode_app_launch(self.uuid())
    }

    /// Encode a weather push for this app, if it displays weather and its
    /// keys resolved.
    fn encode_weather_update(&self, _weather: &WeatherUpdate) -> Option<Vec<u8>> {
        None
    }
}

/// Resolve raw tuples into named fields through a manifest.
///
/// Unresolvable keys are skipped. With no manifest at all, every key is
/// unresolvable and the result is empty (degraded decode).
pub fn resolve_fields(manifest: Option<&KeyManifest>, tuples: &[Tuple]) -> Vec<AppField> {
    let Some(manifest) = manifest else {
        return Vec::new();
    };

    tuples
        .iter()
        .filter_map(|tuple| {
            manifest
                .name_of(tuple.key)
                .map(|name| AppField::new(name, tuple.value.clone()))
        })
        .collect()
}

/// Lookup table of registered codecs, keyed by application uuid.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<Uuid, Box<dyn AppMessageCodec>>,
    next_transaction: u8,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        CodecRegistry {
            codecs: HashMap::new(),
            next_transaction: 0,
        }
    }

    /// Register a codec under its own uuid. A later registration for the
    /// same uuid replaces the earlier one.
    pub fn register(&mut self, codec: Box<dyn AppMessageCodec>) {
        self.codecs.insert(codec.uuid(), codec);
    }

    /// Whether a codec is registered for the uuid.
    pub fn contains(&self, uuid: Uuid) -> bool {
        self.codecs.contains_key(&uuid)
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Decode an inbound dictionary addressed to `uuid`.
    ///
    /// Returns `None` when no codec is registered for the app.
    pub fn decode(&self, uuid: Uuid, tuples: &[Tuple]) -> Option<Vec<DeviceEvent>> {
        self.codecs.get(&uuid).map(|codec| codec.decode(tuples))
    }

    /// Produce the start command for an app, together with its endpoint.
    ///
    /// Apps without a registered codec get the plain launch request, which
    /// is valid for any installed app.
    pub fn start_app(&self, uuid: Uuid) -> (u16, Vec<u8>) {
        match self.codecs.get(&uuid) {
            Some(codec) => (ENDPOINT_APP_LAUNCH, codec.encode_start_command()),
            None => (ENDPOINT_APP_LAUNCH, encode_app_launch(uuid)),
        }
    }

    /// Encode a weather push for an app, if its codec displays weather.
    pub fn encode_weather_update(
        &self,
        uuid: Uuid,
        weather: &WeatherUpdate,
    ) -> Option<Vec<u8>> {
        self.codecs.get(&uuid)?.encode_weather_update(weather)
    }

    /// Encode a named key/value set into an app message push.
    ///
    /// Every name must resolve through the app's manifest; an unresolvable
    /// name fails the whole encode so no partial command reaches the
    /// device.
    pub fn send_key_values(
        &mut self,
        uuid: Uuid,
        fields: &[(&str, TupleValue)],
    ) -> Result<(u16, Vec<u8>), CodecError> {
        let codec = self.codecs.get(&uuid).ok_or(CodecError::UnknownApp(uuid))?;
        let manifest = codec.manifest().ok_or(CodecError::UnknownApp(uuid))?;

        let mut tuples = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            let key = manifest
                .id_of(name)
                .ok_or_else(|| CodecError::UnresolvedKey {
                    uuid,
                    name: name.to_string(),
                })?;
            tuples.push(Tuple::new(key, value.clone()));
        }

        let transaction_id = self.next_transaction;
        self.next_transaction = self.next_transaction.wrapping_add(1);

        let payload = encode_push(transaction_id, uuid, &tuples)?;
        Ok((ENDPOINT_APP_MESSAGE, payload))
    }
}
