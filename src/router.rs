//! Payload handling shared by the async and the blocking client.
//!
//! Everything here is synchronous and free of I/O: the clients fetch or send
//! the raw characteristic value and call into this module for the rest.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::characteristic::Characteristic;
use crate::error::{Error, Result};
use crate::record::{Rgb, SystemState};

pub(crate) fn log_rx(characteristic: Characteristic, uuid: Uuid, data: &[u8]) {
    debug!(?characteristic, %uuid, "RX: {}", hex::encode(data));
}

pub(crate) fn log_tx(characteristic: Characteristic, uuid: Uuid, data: &[u8]) {
    debug!(?characteristic, %uuid, "TX: {}", hex::encode(data));
}

/// The device type string. Invalid UTF-8 is replaced, not rejected.
pub fn decode_device_type(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Split a dedicated LED characteristic into colours.
pub fn decode_rgb_leds(data: &[u8], leds: usize) -> Result<Vec<Rgb>> {
    let expected = leds * Rgb::WIRE_SIZE;
    if data.len() != expected {
        return Err(Error::SizeMismatch {
            record: "RGB",
            expected,
            actual: data.len(),
        });
    }
    Ok(data
        .chunks_exact(Rgb::WIRE_SIZE)
        .map(|c| Rgb::new(c[0], c[1], c[2]))
        .collect())
}

/// Flatten colours for a dedicated LED characteristic.
pub fn encode_rgb_leds(colors: &[Rgb], leds: usize) -> Result<Vec<u8>> {
    check_led_count(colors, leds)?;
    Ok(colors
        .iter()
        .flat_map(|c| [c.red, c.green, c.blue])
        .collect())
}

/// Replace the LEDs of a `SystemState` read from the device.
pub fn inject_rgb(state: &mut SystemState, colors: &[Rgb]) -> Result<()> {
    check_led_count(colors, state.rgb.len())?;
    state.rgb.copy_from_slice(colors);
    Ok(())
}

fn check_led_count(colors: &[Rgb], leds: usize) -> Result<()> {
    if colors.len() != leds {
        return Err(Error::LedCount {
            expected: leds,
            actual: colors.len(),
        });
    }
    Ok(())
}

/// What the Wi-Fi characteristic reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WifiStatus {
    /// The firmware's JSON status document
    Json(Value),
    /// The payload was not JSON; kept as (lossy) text
    Raw { raw: String },
}

pub fn decode_wifi_status(data: &[u8]) -> WifiStatus {
    match serde_json::from_slice(data) {
        Ok(value) => WifiStatus::Json(value),
        Err(err) => {
            warn!("Wi-Fi status is not JSON ({err}), returning raw text");
            WifiStatus::Raw {
                raw: String::from_utf8_lossy(data).into_owned(),
            }
        }
    }
}

/// Credentials for the Wi-Fi characteristic. Unset keys are omitted so the
/// firmware keeps its current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WifiConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

impl WifiConfig<'_> {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::SystemStateUpdate;
    use serde_json::json;

    #[test]
    fn test_rgb_leds_flat_bytes() {
        let colors = [Rgb::new(1, 2, 3), Rgb::new(4, 5, 6), Rgb::new(7, 8, 9)];
        let data = encode_rgb_leds(&colors, 3).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(decode_rgb_leds(&data, 3).unwrap(), colors.to_vec());
    }

    #[test]
    fn test_rgb_leds_size_checks() {
        assert!(matches!(
            decode_rgb_leds(&[0; 8], 3),
            Err(Error::SizeMismatch { record: "RGB", expected: 9, actual: 8 })
        ));
        assert!(matches!(
            encode_rgb_leds(&[Rgb::BLACK], 2),
            Err(Error::LedCount { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_inject_rgb() {
        let mut ss = SystemStateUpdate {
            blower_pwm: Some(5),
            ..Default::default()
        }
        .build();
        inject_rgb(&mut ss, &[Rgb::new(9, 9, 9), Rgb::new(1, 1, 1)]).unwrap();
        assert_eq!(ss.rgb, [Rgb::new(9, 9, 9), Rgb::new(1, 1, 1)]);
        assert_eq!(ss.blower_pwm, 5);
        assert!(matches!(
            inject_rgb(&mut ss, &[Rgb::BLACK; 3]),
            Err(Error::LedCount { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_wifi_status_json() {
        let status = decode_wifi_status(br#"{"connected":true,"ip":"10.0.0.7"}"#);
        assert_eq!(status, WifiStatus::Json(json!({ "connected": true, "ip": "10.0.0.7" })));
    }

    #[test]
    fn test_wifi_status_falls_back_to_raw() {
        let status = decode_wifi_status(b"not json {");
        assert_eq!(
            status,
            WifiStatus::Raw {
                raw: "not json {".to_string()
            }
        );
        assert_eq!(serde_json::to_value(&status).unwrap(), json!({ "raw": "not json {" }));
    }

    #[test]
    fn test_wifi_config_omits_unset_keys() {
        let config = WifiConfig {
            ssid: Some("plant-floor"),
            password: None,
        };
        assert_eq!(config.encode().unwrap(), br#"{"ssid":"plant-floor"}"#.to_vec());
        assert_eq!(WifiConfig::default().encode().unwrap(), b"{}".to_vec());
    }

    #[test]
    fn test_device_type_is_lossy() {
        assert_eq!(decode_device_type(b"ZRS"), "ZRS");
        assert_eq!(decode_device_type(&[b'Z', 0xff]), "Z\u{fffd}");
    }
}
