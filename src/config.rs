use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::characteristic::CharacteristicTable;
use crate::error::Result;

/// Where a device keeps its status LEDs.
///
/// Firmware revisions differ and the device does not advertise which one it
/// runs, so this is configured per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "backend")]
pub enum RgbTopology {
    /// The two LEDs are part of `SystemState`; writes are read-modify-write
    /// of the whole record.
    #[default]
    Embedded,
    /// A dedicated characteristic holding `leds` flat `[r, g, b]` triples.
    Dedicated { leds: usize },
}

impl RgbTopology {
    pub fn led_count(&self) -> usize {
        match self {
            RgbTopology::Embedded => 2,
            RgbTopology::Dedicated { leds } => *leds,
        }
    }
}

/// Per-deployment settings.
///
/// Every key is optional in the JSON form:
///
/// ```
/// let config = zellenrad::ClientConfig::from_json(r#"{
///     "device_name": "ZRS-01",
///     "rgb": { "backend": "dedicated", "leds": 4 }
/// }"#).unwrap();
/// assert_eq!(config.rgb.led_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub characteristics: CharacteristicTable,
    pub rgb: RgbTopology,
    /// Only connect to a device advertising this local name
    pub device_name: Option<String>,
    pub scan_timeout_s: u64,
}

impl ClientConfig {
    const DEFAULT_SCAN_TIMEOUT_S: u64 = 30;

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_s)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            characteristics: CharacteristicTable::default(),
            rgb: RgbTopology::default(),
            device_name: None,
            scan_timeout_s: Self::DEFAULT_SCAN_TIMEOUT_S,
        }
    }
}

#[test]
fn test_empty_config_is_default() {
    assert_eq!(ClientConfig::from_json("{}").unwrap(), ClientConfig::default());
    assert_eq!(ClientConfig::default().scan_timeout(), Duration::from_secs(30));
    assert_eq!(ClientConfig::default().rgb, RgbTopology::Embedded);
}

#[test]
fn test_rgb_topology_json() {
    let config = ClientConfig::from_json(r#"{ "rgb": { "backend": "embedded" } }"#).unwrap();
    assert_eq!(config.rgb.led_count(), 2);
    let config =
        ClientConfig::from_json(r#"{ "rgb": { "backend": "dedicated", "leds": 3 } }"#).unwrap();
    assert_eq!(config.rgb, RgbTopology::Dedicated { leds: 3 });
}

#[test]
fn test_bad_config_is_json_error() {
    let err = ClientConfig::from_json(r#"{ "scan_timeout_s": "soon" }"#).unwrap_err();
    assert!(matches!(err, crate::Error::Json(_)));
}
