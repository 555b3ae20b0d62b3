//! Codec for the Square watch face.
//!
//! Square exposes a larger configuration surface (weather mode, unit,
//! location) next to the weather fields themselves. Config echoes from the
//! watch resolve as ordinary fields; raw condition codes fold through the
//! icon table like Healthify's.

use log::warn;
use uuid::Uuid;

use wristlink_manifest::{KeyManifest, ManifestStore};
use wristlink_protocol::{encode_push, AppField, DeviceEvent, Tuple, TupleValue};

use crate::codec::AppMessageCodec;
use crate::weather::{icon_for_condition, WeatherUpdate};

const KEY_CELSIUS_TEMPERATURE: &str = "CfgKeyCelsiusTemperature";
const KEY_CONDITIONS: &str = "CfgKeyConditions";

/// Codec for the Square watch face.
pub struct SquareCodec {
    uuid: Uuid,
    manifest: Option<KeyManifest>,
    key_temperature: Option<u32>,
    key_conditions: Option<u32>,
}

impl SquareCodec {
    /// Well-known uuid of the published watch face.
    pub const APP_UUID: Uuid = Uuid::from_u128(0x8c46_2e07_5d21_48d9_b5ae_03f1_9c77_6b40);

    /// Construct the codec, resolving its keys from the manifest store.
    pub fn new(uuid: Uuid, store: &dyn ManifestStore) -> Self {
        let manifest = match store.resolve(uuid) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("square codec for {} running degraded: {}", uuid, e);
                None
            }
        };

        let key_temperature = manifest
            .as_ref()
            .and_then(|m| m.id_of(KEY_CELSIUS_TEMPERATURE));
        let key_conditions = manifest.as_ref().and_then(|m| m.id_of(KEY_CONDITIONS));
        if manifest.is_some() && (key_temperature.is_none() || key_conditions.is_none()) {
            warn!("square manifest for {} is missing weather keys, weather push disabled", uuid);
        }

        SquareCodec {
            uuid,
            manifest,
            key_temperature,
            key_conditions,
        }
    }
}

impl AppMessageCodec for SquareCodec {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn manifest(&self) -> Option<&KeyManifest> {
        self.manifest.as_ref()
    }

    fn decode(&self, tuples: &[Tuple]) -> Vec<DeviceEvent> {
        let Some(manifest) = self.manifest() else {
            return Vec::new();
        };

        let mut fields = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            let Some(name) = manifest.name_of(tuple.key) else {
                continue;
            };

            if Some(tuple.key) == self.key_conditions {
                if let Some(code) = tuple.value.as_int() {
                    let icon = icon_for_condition(code, false);
                    fields.push(AppField::new(name, TupleValue::CString(icon.to_string())));
                    continue;
                }
            }

            fields.push(AppField::new(name, tuple.value.clone()));
        }

        if fields.is_empty() {
            return Vec::new();
        }
        vec![DeviceEvent::AppMessage {
            uuid: self.uuid,
            fields,
        }]
    }

    fn encode_weather_update(&self, weather: &WeatherUpdate) -> Option<Vec<u8>> {
        let key_temperature = self.key_temperature?;
        let key_conditions = self.key_conditions?;

        let icon = icon_for_condition(weather.condition_code, weather.is_night);
        let tuples = [
            Tuple::new(key_temperature, TupleValue::Int(weather.temperature_celsius)),
            Tuple::new(key_conditions, TupleValue::CString(icon.to_string())),
        ];
        encode_push(0, self.uuid, &tuples).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wristlink_manifest::MemoryManifestStore;
    use wristlink_protocol::AppMessageFrame;

    fn codec() -> SquareCodec {
        let mut keys = HashMap::new();
        keys.insert(KEY_CELSIUS_TEMPERATURE.to_string(), 10u32);
        keys.insert(KEY_CONDITIONS.to_string(), 11u32);
        keys.insert("CfgKeyWeatherMode".to_string(), 12u32);
        keys.insert("CfgKeyUseCelsius".to_string(), 13u32);
        keys.insert("CfgKeyWeatherLocation".to_string(), 14u32);

        let mut store = MemoryManifestStore::new();
        store.insert(KeyManifest::new(SquareCodec::APP_UUID, keys));
        SquareCodec::new(SquareCodec::APP_UUID, &store)
    }

    #[test]
    fn test_weather_push() {
        let codec = codec();

        let payload = codec
            .encode_weather_update(&WeatherUpdate {
                temperature_celsius: 28,
                condition_code: 804,
                is_night: false,
            })
            .unwrap();

        let AppMessageFrame::Push { tuples, .. } = AppMessageFrame::decode(&payload).unwrap()
        else {
            panic!("expected a push frame");
        };
        assert_eq!(tuples[0].value, TupleValue::Int(28));
        assert_eq!(tuples[1].value, TupleValue::CString("d".to_string()));
    }

    #[test]
    fn test_decode_config_echo() {
        let codec = codec();

        let tuples = [
            Tuple::new(12, TupleValue::Uint(1)),
            Tuple::new(14, TupleValue::CString("Berlin".to_string())),
        ];
        let events = codec.decode(&tuples);
        assert_eq!(events.len(), 1);
        match &events[0] {
            DeviceEvent::AppMessage { fields, .. } => {
                assert_eq!(fields[0].name, "CfgKeyWeatherMode");
                assert_eq!(fields[1].name, "CfgKeyWeatherLocation");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
