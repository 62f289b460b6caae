use serde::Serialize;
use serde_json::Value;

use super::float;
use crate::codec::{WireFormat, WireReader, WireWriter};
use crate::error::Result;
use crate::update::ManualControlUpdate;

/// Transient actuation command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManualControl {
    #[serde(serialize_with = "float::serialize")]
    pub blower_rpm: f32,
    #[serde(serialize_with = "float::serialize")]
    pub getriebemotor_pwm: f32,
    #[serde(serialize_with = "float::serialize")]
    pub vibrationsmotor_pwm: f32,
    /// Persist the gear motor enable flag in NVS
    pub enable_getriebemotor_nvs: u8,
    /// Run the feeder for this many seconds
    #[serde(serialize_with = "float::serialize")]
    pub feeder_seconds: f32,
    /// Passed through verbatim
    pub reserved: [u8; 8],
}

impl ManualControl {
    pub fn to_json(&self) -> Value {
        serde_json::json!(self)
    }

    /// Build a record from a sparse JSON object. Missing or `null` float
    /// keys become sentinels, `reserved` is cut or zero-padded to 8 bytes.
    pub fn from_json(value: Value) -> Result<Self> {
        let update: ManualControlUpdate = serde_json::from_value(value)?;
        Ok(update.build())
    }
}

impl WireFormat for ManualControl {
    const NAME: &'static str = "ManualControl";
    const WIRE_SIZE: usize = 25;

    fn write_fields(&self, w: &mut WireWriter) {
        w.f32(self.blower_rpm);
        w.f32(self.getriebemotor_pwm);
        w.f32(self.vibrationsmotor_pwm);
        w.u8(self.enable_getriebemotor_nvs);
        w.f32(self.feeder_seconds);
        w.bytes(&self.reserved);
    }

    fn read_fields(r: &mut WireReader<'_>) -> Self {
        Self {
            blower_rpm: r.f32(),
            getriebemotor_pwm: r.f32(),
            vibrationsmotor_pwm: r.f32(),
            enable_getriebemotor_nvs: r.u8(),
            feeder_seconds: r.f32(),
            reserved: r.array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sentinel::FLOAT_NO_CHANGE_BITS;
    use crate::update::ManualControlUpdate;
    use serde_json::json;

    fn sample() -> ManualControl {
        ManualControl {
            blower_rpm: 1200.0,
            getriebemotor_pwm: 55.5,
            vibrationsmotor_pwm: 66.6,
            enable_getriebemotor_nvs: 1,
            feeder_seconds: 5.0,
            reserved: [0; 8],
        }
    }

    #[test]
    fn test_encode_matches_firmware_layout() {
        let data = sample().encode();
        assert_eq!(
            hex::encode(&data),
            "0000964400005e4233338542010000a0400000000000000000"
        );
    }

    #[test]
    fn test_roundtrip_projection() {
        let mc = sample();
        let back = ManualControl::decode(&mc.encode()).unwrap();
        assert_eq!(back.to_json(), mc.to_json());
        assert_eq!(back.to_json()["reserved"], json!([0, 0, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_reserved_preserved_verbatim() {
        let mut mc = sample();
        mc.reserved = [0xde, 0xad, 0xbe, 0xef, 0, 1, 2, 3];
        let data = mc.encode();
        assert_eq!(&data[17..], &mc.reserved);
        assert_eq!(ManualControl::decode(&data).unwrap().reserved, mc.reserved);
    }

    #[test]
    fn test_one_byte_short_is_size_mismatch() {
        let data = sample().encode();
        assert!(matches!(
            ManualControl::decode(&data[..24]),
            Err(Error::SizeMismatch { expected: 25, actual: 24, .. })
        ));
        let mut long = data.clone();
        long.push(0);
        assert!(matches!(
            ManualControl::decode(&long),
            Err(Error::SizeMismatch { expected: 25, actual: 26, .. })
        ));
        assert!(matches!(
            ManualControl::decode(&[0u8; 20]),
            Err(Error::SizeMismatch { actual: 20, .. })
        ));
    }

    #[test]
    fn test_from_json_reserved_is_fixed_length() {
        let short = ManualControl::from_json(json!({ "reserved": [1, 2, 3] })).unwrap();
        assert_eq!(short.reserved, [1, 2, 3, 0, 0, 0, 0, 0]);
        let long = ManualControl::from_json(json!({ "reserved": vec![9_u8; 12] })).unwrap();
        assert_eq!(long.reserved, [9; 8]);
        assert_eq!(long.encode().len(), 25);
    }

    #[test]
    fn test_from_json_defaults() {
        let mc = ManualControl::from_json(json!({ "feeder_seconds": 2.5 })).unwrap();
        assert!(mc.blower_rpm.is_nan());
        assert!(mc.getriebemotor_pwm.is_nan());
        assert!(mc.vibrationsmotor_pwm.is_nan());
        assert_eq!(mc.enable_getriebemotor_nvs, 0);
        assert_eq!(mc.feeder_seconds, 2.5);
        assert_eq!(mc.reserved, [0; 8]);
        assert_eq!(mc.to_json()["blower_rpm"], Value::Null);
    }

    #[test]
    fn test_boundary_values_keep_size() {
        let zero = ManualControl::decode(&[0u8; 25]).unwrap();
        assert_eq!(zero.encode(), vec![0u8; 25]);
        assert_eq!(zero.feeder_seconds, 0.0);

        let max = ManualControl {
            blower_rpm: f32::MAX,
            getriebemotor_pwm: f32::MAX,
            vibrationsmotor_pwm: f32::MAX,
            enable_getriebemotor_nvs: u8::MAX,
            feeder_seconds: f32::MAX,
            reserved: [0xff; 8],
        };
        assert_eq!(max.encode().len(), 25);
        assert_eq!(ManualControl::decode(&max.encode()).unwrap(), max);

        let sentinel = ManualControlUpdate::default().build();
        let data = sentinel.encode();
        assert_eq!(data.len(), 25);
        assert_eq!(&data[0..4], &FLOAT_NO_CHANGE_BITS.to_le_bytes());
        assert_eq!(&data[17..], &[0; 8]);
        let back = ManualControl::decode(&data).unwrap();
        assert!(back.blower_rpm.is_nan());
        assert!(back.feeder_seconds.is_nan());
        assert_eq!(back.to_json(), sentinel.to_json());
    }

    #[test]
    fn test_infinite_feeder_time_survives_json() {
        let mut mc = sample();
        mc.feeder_seconds = f32::INFINITY;
        let j = mc.to_json();
        assert_eq!(j["feeder_seconds"], json!("inf"));
        assert_eq!(ManualControl::from_json(j).unwrap(), mc);
    }
}
