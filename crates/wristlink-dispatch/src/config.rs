//! Per-device configuration.

use serde::{Deserialize, Serialize};

/// Default low-battery threshold in percent.
pub const DEFAULT_BATTERY_THRESHOLD: u8 = 10;

/// Configuration for one device session.
///
/// Owned by the host's device configuration store and passed in at session
/// construction; the core never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Battery percentage at or below which a low-battery notice is raised.
    #[serde(default = "default_battery_threshold")]
    pub battery_threshold_percent: u8,

    /// Suffix appended to outgoing notification replies (e.g. a trailing
    /// tag). Ignored when empty.
    #[serde(default)]
    pub reply_suffix: Option<String>,
}

fn default_battery_threshold() -> u8 {
    DEFAULT_BATTERY_THRESHOLD
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            battery_threshold_percent: DEFAULT_BATTERY_THRESHOLD,
            reply_suffix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: DeviceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.battery_threshold_percent, DEFAULT_BATTERY_THRESHOLD);
        assert!(config.reply_suffix.is_none());
    }
}
