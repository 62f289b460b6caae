//! The records exchanged with the feeder, one per GATT characteristic.

mod blower_pid;
pub(crate) mod float;
mod manual_control;
mod rgb;
mod system_state;

pub use blower_pid::BlowerPid;
pub use manual_control::ManualControl;
pub use rgb::Rgb;
pub use system_state::SystemState;
