//! Read and configure Metexon "Zellenradschleuse" feeders over Bluetooth Low Energy
//!
//! The feeder exposes a custom GATT service. Its state and settings live in
//! a few characteristics, each holding a packed little-endian C struct from
//! the firmware. Writes always carry a whole struct; a field the caller does
//! not want to change is set to a sentinel ("no change") value instead.
//!
//! Currently the following can be accessed:
//!
//! - System state: pressures, motor current, PWM outputs, blower speed, LEDs, counters
//! - Manual control of blower, gear motor, vibration motor and feeder
//! - Blower PID controller state and tuning
//! - RGB status LEDs
//! - Device type, Wi-Fi status and credentials, OTA trigger
//!
//! The codec ([`codec`], [`record`], [`update`]) is plain synchronous code
//! with no I/O. [`ZellenradClient`] routes records over any [`Gatt`]
//! transport; [`BleTransport`] is one backed by the platform BLE stack and
//! [`BlockingClient`] wraps a transport for callers without a runtime.
//!
//! # Example
//!
//! ```no_run
//! # use zellenrad::{BleTransport, ClientConfig, ZellenradClient};
//! # use zellenrad::update::BlowerPidUpdate;
//! #
//! # #[tokio::main]
//! # pub async fn main(){
//!     let config = ClientConfig::default();
//!     let transport = BleTransport::connect(&config).await.unwrap();
//!     let client = ZellenradClient::new(transport, config);
//!
//!     let state = client.read_system_state().await.unwrap();
//!     println!("{}", state.to_json());
//!
//!     // Change Kp, leave the rest of the controller alone
//!     let pid = client.read_blower_pid().await.unwrap();
//!     let update = BlowerPidUpdate { kp: Some(pid.kp * 1.1), ..Default::default() };
//!     client.write_blower_pid(&update.build()).await.unwrap();
//! # }
//! ```

mod ble;
mod blocking;
pub mod characteristic;
mod client;
pub mod codec;
mod config;
mod error;
mod gatt;
pub mod record;
pub mod router;
pub mod sentinel;
pub mod update;

pub use ble::BleTransport;
pub use blocking::BlockingClient;
pub use characteristic::{Characteristic, CharacteristicTable, Routed};
pub use client::ZellenradClient;
pub use codec::WireFormat;
pub use config::{ClientConfig, RgbTopology};
pub use error::{Error, Result};
pub use gatt::Gatt;
pub use record::{BlowerPid, ManualControl, Rgb, SystemState};
pub use router::WifiStatus;
