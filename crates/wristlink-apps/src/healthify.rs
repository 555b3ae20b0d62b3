//! Codec for the Healthify watch face.
//!
//! Healthify displays a temperature and a condition icon. The app reports
//! raw numeric condition codes in some messages; those are folded through
//! the icon table on decode (day variant, the report carries no day/night
//! flag).

use log::warn;
use uuid::Uuid;

use wristlink_manifest::{KeyManifest, ManifestStore};
use wristlink_protocol::{encode_push, AppField, DeviceEvent, Tuple, TupleValue};

use crate::codec::AppMessageCodec;
use crate::weather::{icon_for_condition, WeatherUpdate};

const KEY_TEMPERATURE: &str = "TEMPERATURE";
const KEY_CONDITIONS: &str = "CONDITIONS";

/// Codec for the Healthify watch face.
pub struct HealthifyCodec {
    uuid: Uuid,
    manifest: Option<KeyManifest>,
    key_temperature: Option<u32>,
    key_conditions: Option<u32>,
}

impl HealthifyCodec {
    /// Well-known uuid of the published watch face.
    pub const APP_UUID: Uuid = Uuid::from_u128(0x2f9b_7c13_41d5_4b36_9e0c_55a1_d3c4_8a12);

    /// Construct the codec, resolving its keys from the manifest store.
    pub fn new(uuid: Uuid, store: &dyn ManifestStore) -> Self {
        let manifest = match store.resolve(uuid) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("healthify codec for {} running degraded: {}", uuid, e);
                None
            }
        };

        let key_temperature = manifest.as_ref().and_then(|m| m.id_of(KEY_TEMPERATURE));
        let key_conditions = manifest.as_ref().and_then(|m| m.id_of(KEY_CONDITIONS));
        if manifest.is_some() && (key_temperature.is_none() || key_conditions.is_none()) {
            warn!("healthify manifest for {} is missing weather keys, weather push disabled", uuid);
        }

        HealthifyCodec {
            uuid,
            manifest,
            key_temperature,
            key_conditions,
        }
    }
}

impl AppMessageCodec for HealthifyCodec {
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
                continue; // Unknown key: a future app version's field.
            };

            // Raw condition codes are folded to icon identifiers.
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
