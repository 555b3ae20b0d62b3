//! Codec for the Obsidian watch face.
//!
//! Obsidian takes its weather as a pre-rendered icon character plus a
//! temperature. Its manifest names many configuration keys; only the
//! weather keys matter to the host.

use log::warn;
use uuid::Uuid;

use wristlink_manifest::{KeyManifest, ManifestStore};
use wristlink_protocol::{encode_push, DeviceEvent, Tuple, TupleValue};

use crate::codec::{resolve_fields, AppMessageCodec};
use crate::weather::{icon_for_condition, WeatherUpdate};

const KEY_WEATHER_TEMP: &str = "MSG_KEY_WEATHER_TEMP";
const KEY_WEATHER_ICON: &str = "MSG_KEY_WEATHER_ICON";

/// Codec for the Obsidian watch face.
pub struct ObsidianCodec {
    uuid: Uuid,
    manifest: Option<KeyManifest>,
    key_weather_temp: Option<u32>,
    key_weather_icon: Option<u32>,
}

impl ObsidianCodec {
    /// Well-known uuid of the published watch face.
    pub const APP_UUID: Uuid = Uuid::from_u128(0xef42_caba_9b4a_4b42_8e51_8f6a_1e1d_2c01);

    /// Construct the codec, resolving its keys from the manifest store.
    ///
    /// A missing or malformed manifest degrades decoding and disables the
    /// weather push; registration still succeeds.
    pub fn new(uuid: Uuid, store: &dyn ManifestStore) -> Self {
        let manifest = match store.resolve(uuid) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("obsidian codec for {} running degraded: {}", uuid, e);
                None
            }
        };

        let key_weather_temp = manifest.as_ref().and_then(|m| m.id_of(KEY_WEATHER_TEMP));
        let key_weather_icon = manifest.as_ref().and_then(|m| m.id_of(KEY_WEATHER_ICON));
        if manifest.is_some() && (key_weather_temp.is_none() || key_weather_icon.is_none()) {
            warn!("obsidian manifest for {} is missing weather keys, weather push disabled", uuid);
        }

        ObsidianCodec {
            uuid,
            manifest,
            key_weather_temp,
            key_weather_icon,
        }
    }
}

impl AppMessageCodec for ObsidianCodec {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn manifest(&self) -> Option<&KeyManifest> {
        self.manifest.as_ref()
    }

    fn decode(&self, tuples: &[Tuple]) -> Vec<DeviceEvent> {
        let fields = resolve_fields(self.manifest(), tuples);
        if fields.is_empty() {
            return Vec::new();
        }
        vec![DeviceEvent::AppMessage {
            uuid: self.uuid,
            fields,
        }]
    }

    fn encode_weather_update(&self, weather: &WeatherUpdate) -> Option<Vec<u8>> {
        let key_temp = self.key_weather_temp?;
        let key_icon = self.key_weather_icon?;

        let icon = icon_for_condition(weather.condition_code, weather.is_night);
        let tuples = [
            Tuple::new(key_icon, TupleValue::CString(icon.to_string())),
            Tuple::new(key_temp, TupleValue::Int(weather.temperature_celsius)),
        ];
        encode_push(0, self.uuid, &tuples).ok()
    }
}
