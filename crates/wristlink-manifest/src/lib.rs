//! Per-application key manifests.
//!
//! Third-party watch applications assign their message key ids dynamically:
//! the same symbolic key (say `MSG_KEY_WEATHER_TEMP`) maps to a different
//! numeric id in every app. The mapping ships alongside the app's
//! installable bundle as a JSON file with an `appKeys` object:
//!
//! ```json
//! {
//!   "appKeys": {
//!     "MSG_KEY_WEATHER_TEMP": 100,
//!     "MSG_KEY_WEATHER_ICON": 101
//!   }
//! }
//! ```
//!
//! A [`ManifestStore`] resolves an application uuid to its [`KeyManifest`].
//! Resolution failures are recoverable: the requesting codec degrades to
//! partial decoding instead of failing registration.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while resolving a key manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No manifest exists for the requested application.
    #[error("no key manifest available for app {0}")]
    Unavailable(Uuid),

    /// The manifest exists but could not be parsed.
    #[error("malformed key manifest for app {uuid}: {reason}")]
    Malformed {
        /// Owning application uuid.
        uuid: Uuid,
        /// Human-readable parse failure.
        reason: String,
    },
}

/// An immutable name → key-id mapping scoped to one application.
#[derive(Debug, Clone)]
pub struct KeyManifest {
    uuid: Uuid,
    keys: HashMap<String, u32>,
    names: HashMap<u32, String>,
}

impl KeyManifest {
    /// Create a manifest from a name → id mapping.
    pub fn new(uuid: Uuid, keys: HashMap<String, u32>) -> Self {
        let names = keys.iter().map(|(name, &id)| (id, name.clone())).collect();
        KeyManifest { uuid, keys, names }
    }

    /// The owning application uuid.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Look up the numeric id for a symbolic key name.
    ///
    /// An absent name is not an error; callers fall back to partial
    /// decoding.
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.keys.get(name).copied()
    }

    /// Reverse lookup: the symbolic name for a numeric id.
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(|s| s.as_str())
    }

    /// Number of keys in the manifest.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the manifest has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Parse a manifest from JSON text.
    pub fn from_json(uuid: Uuid, json: &str) -> Result<Self, ManifestError> {
        let malformed = |reason: String| ManifestError::Malformed { uuid, reason };

        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
        let app_keys = value
            .get("appKeys")
            .and_then(|v| v.as_object())
            .ok_or_else(|| malformed("missing appKeys object".to_string()))?;

        let mut keys = HashMap::with_capacity(app_keys.len());
        for (name, id) in app_keys {
            let id = id
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| malformed(format!("key '{}' has a non-integer id", name)))?;
            keys.insert(name.clone(), id);
        }

        Ok(KeyManifest::new(uuid, keys))
    }
}

/// Read-only source of key manifests, keyed by application uuid.
pub trait ManifestStore {
    /// Resolve the manifest for an application.
    fn resolve(&self, uuid: Uuid) -> Result<KeyManifest, ManifestError>;
}

/// Manifest store backed by a directory of `<uuid>.json` files.
///
/// The directory is the host's app bundle cache; each installed app
/// contributes one manifest file named after its uuid (hyphenated,
/// lowercase).
#[derive(Debug, Clone)]
pub struct FileManifestStore {
    dir: PathBuf,
}

impl FileManifestStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileManifestStore { dir: dir.into() }
    }

    fn manifest_path(&self, uuid: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", uuid))
    }
}

impl ManifestStore for FileManifestStore {
    fn resolve(&self, uuid: Uuid) -> Result<KeyManifest, ManifestError> {
        let path = self.manifest_path(uuid);
        let mut file = std::fs::File::open(&path).map_err(|_| ManifestError::Unavailable(uuid))?;

        let mut json = String::new();
        file.read_to_string(&mut json)
            .map_err(|e| ManifestError::Malformed {
                uuid,
                reason: e.to_string(),
            })?;

        KeyManifest::from_json(uuid, &json)
    }
}

/// In-memory manifest store for tests and embedded defaults.
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestStore {
    manifests: HashMap<Uuid, KeyManifest>,
}

impl MemoryManifestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryManifestStore::default()
    }

    /// Add a manifest to the store.
    pub fn insert(&mut self, manifest: KeyManifest) {
        self.manifests.insert(manifest.uuid(), manifest);
    }
}

impl ManifestStore for MemoryManifestStore {
    fn resolve(&self, uuid: Uuid) -> Result<KeyManifest, ManifestError> {
        self.manifests
            .get(&uuid)
            .cloned()
            .ok_or(ManifestError::Unavailable(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_uuid() -> Uuid {
        Uuid::from_bytes([0xAA; 16])
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"appKeys": {"TEMPERATURE": 0, "CONDITIONS": 1}}"#;
        let manifest = KeyManifest::from_json(test_uuid(), json).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.id_of("TEMPERATURE"), Some(0));
        assert_eq!(manifest.id_of("CONDITIONS"), Some(1));
        assert_eq!(manifest.id_of("MISSING"), None);
        assert_eq!(manifest.name_of(1), Some("CONDITIONS"));
    }

    #[test]
    fn test_from_json_missing_app_keys() {
        let err = KeyManifest::from_json(test_uuid(), r#"{"name": "watchface"}"#).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn test_from_json_non_integer_id() {
        let err =
            KeyManifest::from_json(test_uuid(), r#"{"appKeys": {"TEMP": "zero"}}"#).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryManifestStore::new();
        assert!(matches!(
            store.resolve(test_uuid()),
            Err(ManifestError::Unavailable(_))
        ));

        let mut keys = HashMap::new();
        keys.insert("TEMPERATURE".to_string(), 7u32);
        store.insert(KeyManifest::new(test_uuid(), keys));

        let manifest = store.resolve(test_uuid()).unwrap();
        assert_eq!(manifest.id_of("TEMPERATURE"), Some(7));
    }

    #[test]
    fn test_file_store_missing() {
        let store = FileManifestStore::new("/nonexistent/manifest/dir");
        assert!(matches!(
            store.resolve(test_uuid()),
            Err(ManifestError::Unavailable(_))
        ));
    }
}
