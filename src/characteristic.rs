//! GATT characteristic identifiers of the Metexon service.
//!
//! The firmware declares its UUIDs with `BLE_UUID128_INIT`, which lists the
//! 128-bit value least significant byte first. The canonical (RFC 4122) form
//! used by host BLE stacks is that byte sequence reversed, once.
//!
//! Firmware revisions have shipped different tables, so the table is part of
//! [`ClientConfig`](crate::ClientConfig); the default is derived from the
//! byte tables below.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::WireFormat;
use crate::record::{BlowerPid, ManualControl, SystemState};

const SERVICE_BYTES: [u8; 16] = [
    0xAA, 0x85, 0x9E, 0x5F, 0xDD, 0x5A, 0x82, 0x42, 0x81, 0x84, 0xC4, 0xE1, 0x23, 0x5F, 0x35, 0x42,
];
const DEVICE_TYPE_BYTES: [u8; 16] = [
    0xA0, 0xAF, 0x5C, 0xCA, 0xB2, 0x97, 0xDF, 0x4F, 0xBC, 0xC2, 0xFA, 0x6B, 0x78, 0xB7, 0xF7, 0x68,
];
const SYSTEM_STATE_BYTES: [u8; 16] = [
    0x68, 0x87, 0x98, 0x89, 0x0F, 0xFE, 0xAC, 0x4F, 0xAD, 0x0D, 0xF0, 0xDB, 0x24, 0xF6, 0xB1, 0x2F,
];
const RGB_LED_BYTES: [u8; 16] = [
    0x6C, 0xD5, 0xD1, 0x16, 0x9A, 0x35, 0x54, 0x4B, 0xBA, 0xCC, 0x47, 0xF1, 0x94, 0x0F, 0x37, 0x95,
];
const BLOWER_PID_BYTES: [u8; 16] = [
    0x4C, 0x38, 0x61, 0x23, 0x01, 0xBB, 0xA4, 0x41, 0x8F, 0x1B, 0x41, 0x8F, 0x95, 0x13, 0xC0, 0x60,
];
const WIFI_BYTES: [u8; 16] = [
    0xBD, 0xDA, 0x5D, 0x96, 0xF0, 0xF6, 0x7F, 0x45, 0x9C, 0x6D, 0x59, 0xF5, 0xB4, 0x6C, 0x77, 0x07,
];
const OTA_BYTES: [u8; 16] = [
    0x3E, 0x2D, 0x88, 0xB7, 0xEA, 0xED, 0x19, 0x43, 0x91, 0xB8, 0xD2, 0x04, 0x5F, 0x85, 0xD1, 0x2C,
];
const MANUAL_CONTROL_BYTES: [u8; 16] = [
    0x7B, 0xC1, 0x42, 0x5E, 0x11, 0xAA, 0x4D, 0x49, 0xA7, 0x77, 0xC5, 0x31, 0x9F, 0x42, 0xB3, 0x56,
];

/// Canonical UUID from the LSB-first byte list of `BLE_UUID128_INIT`.
pub const fn uuid_from_le_bytes(bytes: [u8; 16]) -> Uuid {
    let mut be = [0u8; 16];
    let mut i = 0;
    while i < 16 {
        be[i] = bytes[15 - i];
        i += 1;
    }
    Uuid::from_bytes(be)
}

/// A characteristic of the Metexon service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// ASCII device type, read only
    DeviceType,
    SystemState,
    /// Flat `N x [r, g, b]` LED bytes on firmware with a dedicated LED characteristic
    RgbLed,
    BlowerPid,
    /// JSON status on read, JSON config on write
    Wifi,
    /// Firmware URL, write only
    Ota,
    ManualControl,
}

impl Characteristic {
    pub const ALL: [Characteristic; 7] = [
        Characteristic::DeviceType,
        Characteristic::SystemState,
        Characteristic::RgbLed,
        Characteristic::BlowerPid,
        Characteristic::Wifi,
        Characteristic::Ota,
        Characteristic::ManualControl,
    ];
}

/// UUIDs of the service and its characteristics for one firmware revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacteristicTable {
    pub service: Uuid,
    pub device_type: Uuid,
    pub system_state: Uuid,
    pub rgb_led: Uuid,
    pub blower_pid: Uuid,
    pub wifi: Uuid,
    pub ota: Uuid,
    pub manual_control: Uuid,
}

impl CharacteristicTable {
    /// The table derived from the firmware's `BLE_UUID128_INIT` bytes.
    pub const FIRMWARE: CharacteristicTable = CharacteristicTable {
        service: uuid_from_le_bytes(SERVICE_BYTES),
        device_type: uuid_from_le_bytes(DEVICE_TYPE_BYTES),
        system_state: uuid_from_le_bytes(SYSTEM_STATE_BYTES),
        rgb_led: uuid_from_le_bytes(RGB_LED_BYTES),
        blower_pid: uuid_from_le_bytes(BLOWER_PID_BYTES),
        wifi: uuid_from_le_bytes(WIFI_BYTES),
        ota: uuid_from_le_bytes(OTA_BYTES),
        manual_control: uuid_from_le_bytes(MANUAL_CONTROL_BYTES),
    };

    pub fn uuid(&self, characteristic: Characteristic) -> Uuid {
        match characteristic {
            Characteristic::DeviceType => self.device_type,
            Characteristic::SystemState => self.system_state,
            Characteristic::RgbLed => self.rgb_led,
            Characteristic::BlowerPid => self.blower_pid,
            Characteristic::Wifi => self.wifi,
            Characteristic::Ota => self.ota,
            Characteristic::ManualControl => self.manual_control,
        }
    }
}

impl Default for CharacteristicTable {
    fn default() -> Self {
        Self::FIRMWARE
    }
}

/// A record stored in exactly one characteristic.
pub trait Routed: WireFormat {
    const CHARACTERISTIC: Characteristic;
}

impl Routed for SystemState {
    const CHARACTERISTIC: Characteristic = Characteristic::SystemState;
}

impl Routed for ManualControl {
    const CHARACTERISTIC: Characteristic = Characteristic::ManualControl;
}

impl Routed for BlowerPid {
    const CHARACTERISTIC: Characteristic = Characteristic::BlowerPid;
}

#[test]
fn test_uuid_byte_reversal() {
    let table = CharacteristicTable::default();
    assert_eq!(table.service.to_string(), "42355f23-e1c4-8481-4282-5add5f9e85aa");
    assert_eq!(table.system_state.to_string(), "2fb1f624-dbf0-0dad-4fac-fe0f89988768");
    assert_eq!(table.blower_pid.to_string(), "60c01395-8f41-1b8f-41a4-bb012361384c");
}

#[test]
fn test_uuid_reversal_is_not_mixed_endian() {
    // Uuid::from_bytes_le only swaps the first three groups
    assert_ne!(
        uuid_from_le_bytes(SERVICE_BYTES),
        Uuid::from_bytes_le(SERVICE_BYTES)
    );
    let mut bytes = *uuid_from_le_bytes(SERVICE_BYTES).as_bytes();
    bytes.reverse();
    assert_eq!(bytes, SERVICE_BYTES);
}

#[test]
fn test_table_is_one_to_one() {
    let table = CharacteristicTable::default();
    let mut uuids: Vec<Uuid> = Characteristic::ALL.iter().map(|c| table.uuid(*c)).collect();
    uuids.push(table.service);
    uuids.sort();
    uuids.dedup();
    assert_eq!(uuids.len(), 8);
}

#[test]
fn test_table_overrides_from_json() {
    let table: CharacteristicTable = serde_json::from_str(
        r#"{ "system_state": "00000001-0000-1000-8000-00805f9b34fb" }"#,
    )
    .unwrap();
    assert_eq!(
        table.uuid(Characteristic::SystemState).to_string(),
        "00000001-0000-1000-8000-00805f9b34fb"
    );
    assert_eq!(table.blower_pid, CharacteristicTable::FIRMWARE.blower_pid);
}
