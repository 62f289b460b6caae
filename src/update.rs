//! Partial updates.
//!
//! The firmware has no per-field write: changing one PID gain means writing
//! the whole `BlowerPID` characteristic. Each update type here holds only the
//! fields the caller wants to change and [`build`](BlowerPidUpdate::build)s a
//! complete record in which every other field carries its sentinel. Values
//! are passed through as given; range checks are the firmware's business.
//!
//! ```
//! use zellenrad::update::BlowerPidUpdate;
//!
//! let pid = BlowerPidUpdate { kp: Some(1.1), ..Default::default() }.build();
//! assert_eq!(pid.kp, 1.1);
//! assert!(pid.ki.is_nan());
//! assert_eq!(pid.current_pwm, 0xFFFF);
//! ```
//!
//! The same types deserialize from sparse JSON objects keyed like the record
//! projections; missing keys and `null` mean "leave unchanged". Float keys
//! also take `"inf"` and `"-inf"`, as the projections write them.

use serde::Deserialize;

use crate::codec::fixed_blob;
use crate::record::float;
use crate::record::{BlowerPid, ManualControl, Rgb, SystemState};
use crate::sentinel::or_no_change;

/// Sparse [`SystemState`]. `state` and `rgb` have no no-change encoding and
/// default to `0` and black.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemStateUpdate {
    pub state: Option<u8>,
    #[serde(deserialize_with = "float::deserialize")]
    pub pressure1: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub pressure2: Option<f32>,
    #[serde(rename = "absPressure", deserialize_with = "float::deserialize")]
    pub abs_pressure: Option<f32>,
    #[serde(rename = "motorCurrent", deserialize_with = "float::deserialize")]
    pub motor_current: Option<f32>,
    #[serde(rename = "getriebemotorPWM")]
    pub getriebemotor_pwm: Option<u16>,
    #[serde(rename = "vibrationsmotorPWM")]
    pub vibrationsmotor_pwm: Option<u16>,
    #[serde(rename = "blowerPWM")]
    pub blower_pwm: Option<u16>,
    #[serde(rename = "blowerPulseRateRPM", deserialize_with = "float::deserialize")]
    pub blower_pulse_rate_rpm: Option<f32>,
    pub rgb: Option<[Rgb; 2]>,
    #[serde(rename = "encoderCount")]
    pub encoder_count: Option<i32>,
    #[serde(rename = "blowerPulseCount")]
    pub blower_pulse_count: Option<u32>,
}

impl SystemStateUpdate {
    pub fn build(&self) -> SystemState {
        SystemState {
            state: self.state.unwrap_or(0),
            pressure1: or_no_change(self.pressure1),
            pressure2: or_no_change(self.pressure2),
            abs_pressure: or_no_change(self.abs_pressure),
            motor_current: or_no_change(self.motor_current),
            getriebemotor_pwm: or_no_change(self.getriebemotor_pwm),
            vibrationsmotor_pwm: or_no_change(self.vibrationsmotor_pwm),
            blower_pwm: or_no_change(self.blower_pwm),
            blower_pulse_rate_rpm: or_no_change(self.blower_pulse_rate_rpm),
            rgb: self.rgb.unwrap_or([Rgb::BLACK; 2]),
            encoder_count: or_no_change(self.encoder_count),
            blower_pulse_count: or_no_change(self.blower_pulse_count),
        }
    }
}

/// Sparse [`ManualControl`]. The NVS flag defaults to `0`, `reserved` to
/// zeros; a `reserved` of the wrong length is cut or zero-padded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManualControlUpdate {
    #[serde(deserialize_with = "float::deserialize")]
    pub blower_rpm: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub getriebemotor_pwm: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub vibrationsmotor_pwm: Option<f32>,
    pub enable_getriebemotor_nvs: Option<u8>,
    #[serde(deserialize_with = "float::deserialize")]
    pub feeder_seconds: Option<f32>,
    pub reserved: Option<Vec<u8>>,
}

impl ManualControlUpdate {
    pub fn build(&self) -> ManualControl {
        ManualControl {
            blower_rpm: or_no_change(self.blower_rpm),
            getriebemotor_pwm: or_no_change(self.getriebemotor_pwm),
            vibrationsmotor_pwm: or_no_change(self.vibrationsmotor_pwm),
            enable_getriebemotor_nvs: self.enable_getriebemotor_nvs.unwrap_or(0),
            feeder_seconds: or_no_change(self.feeder_seconds),
            reserved: fixed_blob(self.reserved.as_deref().unwrap_or_default()),
        }
    }
}

/// Sparse [`BlowerPid`].
///
/// `update_interval_ms`, `flags` and `last_update_tick` default to `0`, not
/// to the u32 sentinel, which is what the firmware expects from partial
/// PID writes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlowerPidUpdate {
    #[serde(deserialize_with = "float::deserialize")]
    pub kp: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub ki: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub kd: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub target_frequency: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub current_frequency: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub last_error: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub integral_sum: Option<f32>,
    pub current_pwm: Option<u16>,
    pub manual_pwm_value: Option<u16>,
    pub min_pwm_output: Option<u16>,
    pub max_pwm_output: Option<u16>,
    pub update_interval_ms: Option<u32>,
    pub flags: Option<u32>,
    pub last_update_tick: Option<u32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub feed_forward: Option<f32>,
    #[serde(deserialize_with = "float::deserialize")]
    pub derivative_filter_hz: Option<f32>,
    #[serde(deserialize_with = "float::deserialize_array")]
    pub reserved_floats: [Option<f32>; 4],
}

impl BlowerPidUpdate {
    pub fn build(&self) -> BlowerPid {
        BlowerPid {
            kp: or_no_change(self.kp),
            ki: or_no_change(self.ki),
            kd: or_no_change(self.kd),
            target_frequency: or_no_change(self.target_frequency),
            current_frequency: or_no_change(self.current_frequency),
            last_error: or_no_change(self.last_error),
            integral_sum: or_no_change(self.integral_sum),
            current_pwm: or_no_change(self.current_pwm),
            manual_pwm_value: or_no_change(self.manual_pwm_value),
            min_pwm_output: or_no_change(self.min_pwm_output),
            max_pwm_output: or_no_change(self.max_pwm_output),
            update_interval_ms: self.update_interval_ms.unwrap_or(0),
            flags: self.flags.unwrap_or(0),
            last_update_tick: self.last_update_tick.unwrap_or(0),
            feed_forward: or_no_change(self.feed_forward),
            derivative_filter_hz: or_no_change(self.derivative_filter_hz),
            reserved_floats: self.reserved_floats.map(or_no_change),
        }
    }
}
