use serde::Serialize;
use serde_json::Value;

use super::float;
use crate::codec::{WireFormat, WireReader, WireWriter};
use crate::error::Result;
use crate::update::BlowerPidUpdate;

/// State and tuning of the blower's closed-loop speed controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlowerPid {
    #[serde(serialize_with = "float::serialize")]
    pub kp: f32,
    #[serde(serialize_with = "float::serialize")]
    pub ki: f32,
    #[serde(serialize_with = "float::serialize")]
    pub kd: f32,
    /// Blower tacho frequency setpoint in Hz
    #[serde(serialize_with = "float::serialize")]
    pub target_frequency: f32,
    #[serde(serialize_with = "float::serialize")]
    pub current_frequency: f32,
    #[serde(serialize_with = "float::serialize")]
    pub last_error: f32,
    #[serde(serialize_with = "float::serialize")]
    pub integral_sum: f32,
    pub current_pwm: u16,
    /// PWM used while the controller is in manual mode
    pub manual_pwm_value: u16,
    pub min_pwm_output: u16,
    pub max_pwm_output: u16,
    pub update_interval_ms: u32,
    pub flags: u32,
    /// Firmware tick of the last controller step
    pub last_update_tick: u32,
    #[serde(serialize_with = "float::serialize")]
    pub feed_forward: f32,
    #[serde(serialize_with = "float::serialize")]
    pub derivative_filter_hz: f32,
    /// Each slot may independently carry the float sentinel
    #[serde(serialize_with = "float::serialize_array")]
    pub reserved_floats: [f32; 4],
}

impl BlowerPid {
    /// Structured projection. Floats are single precision and every NaN,
    /// including unused `reserved_floats` slots, becomes `null` so projections
    /// compare by value. Infinities are `"inf"` and `"-inf"`.
    pub fn to_json(&self) -> Value {
        serde_json::json!(self)
    }

    /// Build a record from a sparse JSON object, see [`BlowerPidUpdate`] for
    /// the defaults.
    pub fn from_json(value: Value) -> Result<Self> {
        let update: BlowerPidUpdate = serde_json::from_value(value)?;
        Ok(update.build())
    }
}

impl WireFormat for BlowerPid {
    const NAME: &'static str = "BlowerPID";
    const WIRE_SIZE: usize = 72;

    fn write_fields(&self, w: &mut WireWriter) {
        w.f32(self.kp);
        w.f32(self.ki);
        w.f32(self.kd);
        w.f32(self.target_frequency);
        w.f32(self.current_frequency);
        w.f32(self.last_error);
        w.f32(self.integral_sum);
        w.u16(self.current_pwm);
        w.u16(self.manual_pwm_value);
        w.u16(self.min_pwm_output);
        w.u16(self.max_pwm_output);
        w.u32(self.update_interval_ms);
        w.u32(self.flags);
        w.u32(self.last_update_tick);
        w.f32(self.feed_forward);
        w.f32(self.derivative_filter_hz);
        for v in self.reserved_floats {
            w.f32(v);
        }
    }

    fn read_fields(r: &mut WireReader<'_>) -> Self {
        Self {
            kp: r.f32(),
            ki: r.f32(),
            kd: r.f32(),
            target_frequency: r.f32(),
            current_frequency: r.f32(),
            last_error: r.f32(),
            integral_sum: r.f32(),
            current_pwm: r.u16(),
            manual_pwm_value: r.u16(),
            min_pwm_output: r.u16(),
            max_pwm_output: r.u16(),
            update_interval_ms: r.u32(),
            flags: r.u32(),
            last_update_tick: r.u32(),
            feed_forward: r.f32(),
            derivative_filter_hz: r.f32(),
            reserved_floats: [r.f32(), r.f32(), r.f32(), r.f32()],
        }
    }
}
