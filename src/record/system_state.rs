use serde::Serialize;
use serde_json::Value;

use super::{float, Rgb};
use crate::codec::{WireFormat, WireReader, WireWriter};
use crate::error::Result;
use crate::update::SystemStateUpdate;

/// Telemetry and configuration snapshot of the feeder.
///
/// The firmware reports this fresh on every read. A write replaces the whole
/// record; fields carrying a sentinel are left alone by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemState {
    /// Firmware status code
    pub state: u8,
    /// Pressure sensor 1
    #[serde(serialize_with = "float::serialize")]
    pub pressure1: f32,
    /// Pressure sensor 2
    #[serde(serialize_with = "float::serialize")]
    pub pressure2: f32,
    /// Absolute pressure
    #[serde(rename = "absPressure", serialize_with = "float::serialize")]
    pub abs_pressure: f32,
    /// Rotary valve motor current
    #[serde(rename = "motorCurrent", serialize_with = "float::serialize")]
    pub motor_current: f32,
    #[serde(rename = "getriebemotorPWM")]
    pub getriebemotor_pwm: u16,
    #[serde(rename = "vibrationsmotorPWM")]
    pub vibrationsmotor_pwm: u16,
    #[serde(rename = "blowerPWM")]
    pub blower_pwm: u16,
    /// Blower speed derived from its tacho pulses
    #[serde(rename = "blowerPulseRateRPM", serialize_with = "float::serialize")]
    pub blower_pulse_rate_rpm: f32,
    /// Status LEDs
    pub rgb: [Rgb; 2],
    #[serde(rename = "encoderCount")]
    pub encoder_count: i32,
    #[serde(rename = "blowerPulseCount")]
    pub blower_pulse_count: u32,
}

impl SystemState {
    /// Structured projection. Floats are single precision, NaN becomes `null`
    /// and infinities `"inf"`/`"-inf"`.
    pub fn to_json(&self) -> Value {
        serde_json::json!(self)
    }

    /// Build a record from a sparse JSON object. Missing or `null` keys
    /// become sentinels.
    pub fn from_json(value: Value) -> Result<Self> {
        let update: SystemStateUpdate = serde_json::from_value(value)?;
        Ok(update.build())
    }
}

impl WireFormat for SystemState {
    const NAME: &'static str = "SystemState";
    const WIRE_SIZE: usize = 41;

    fn write_fields(&self, w: &mut WireWriter) {
        w.u8(self.state);
        w.f32(self.pressure1);
        w.f32(self.pressure2);
        w.f32(self.abs_pressure);
        w.f32(self.motor_current);
        w.u16(self.getriebemotor_pwm);
        w.u16(self.vibrationsmotor_pwm);
        w.u16(self.blower_pwm);
        w.f32(self.blower_pulse_rate_rpm);
        for led in &self.rgb {
            led.write_fields(w);
        }
        w.i32(self.encoder_count);
        w.u32(self.blower_pulse_count);
    }

    fn read_fields(r: &mut WireReader<'_>) -> Self {
        Self {
            state: r.u8(),
            pressure1: r.f32(),
            pressure2: r.f32(),
            abs_pressure: r.f32(),
            motor_current: r.f32(),
            getriebemotor_pwm: r.u16(),
            vibrationsmotor_pwm: r.u16(),
            blower_pwm: r.u16(),
            blower_pulse_rate_rpm: r.f32(),
            rgb: [Rgb::read_fields(r), Rgb::read_fields(r)],
            encoder_count: r.i32(),
            blower_pulse_count: r.u32(),
        }
    }
}
