use tracing::info;

use crate::characteristic::{Characteristic, Routed};
use crate::config::{ClientConfig, RgbTopology};
use crate::error::Result;
use crate::gatt::Gatt;
use crate::record::{BlowerPid, ManualControl, Rgb, SystemState};
use crate::router::{self, WifiConfig, WifiStatus};

/// Typed access to a Zellenradschleuse over any [`Gatt`] transport.
///
/// Each call is exactly one GATT read or write, except the RGB write on
/// [`RgbTopology::Embedded`] devices, which reads `SystemState` first.
pub struct ZellenradClient<G> {
    gatt: G,
    config: ClientConfig,
}

impl<G: Gatt> ZellenradClient<G> {
    pub fn new(gatt: G, config: ClientConfig) -> Self {
        Self { gatt, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Give back the transport, e.g. to disconnect it.
    pub fn into_inner(self) -> G {
        self.gatt
    }

    async fn read_raw(&self, characteristic: Characteristic) -> Result<Vec<u8>> {
        let uuid = self.config.characteristics.uuid(characteristic);
        let data = self.gatt.read(uuid).await?;
        router::log_rx(characteristic, uuid, &data);
        Ok(data)
    }

    async fn write_raw(&self, characteristic: Characteristic, data: &[u8]) -> Result<()> {
        let uuid = self.config.characteristics.uuid(characteristic);
        router::log_tx(characteristic, uuid, data);
        self.gatt.write(uuid, data).await?;
        Ok(())
    }

    /// Read and decode any record.
    pub async fn read<R: Routed>(&self) -> Result<R> {
        R::decode(&self.read_raw(R::CHARACTERISTIC).await?)
    }

    /// Encode and write any record.
    pub async fn write<R: Routed>(&self, record: &R) -> Result<()> {
        self.write_raw(R::CHARACTERISTIC, &record.encode()).await
    }

    pub async fn device_type(&self) -> Result<String> {
        let data = self.read_raw(Characteristic::DeviceType).await?;
        Ok(router::decode_device_type(&data))
    }

    pub async fn read_system_state(&self) -> Result<SystemState> {
        self.read().await
    }

    pub async fn write_system_state(&self, value: &SystemState) -> Result<()> {
        self.write(value).await
    }

    pub async fn read_manual_control(&self) -> Result<ManualControl> {
        self.read().await
    }

    pub async fn write_manual_control(&self, value: &ManualControl) -> Result<()> {
        self.write(value).await
    }

    pub async fn read_blower_pid(&self) -> Result<BlowerPid> {
        self.read().await
    }

    pub async fn write_blower_pid(&self, value: &BlowerPid) -> Result<()> {
        self.write(value).await
    }

    /// Current LED colours, from whichever characteristic the configured
    /// [`RgbTopology`] names.
    pub async fn read_rgb(&self) -> Result<Vec<Rgb>> {
        match self.config.rgb {
            RgbTopology::Embedded => Ok(self.read_system_state().await?.rgb.to_vec()),
            RgbTopology::Dedicated { leds } => {
                let data = self.read_raw(Characteristic::RgbLed).await?;
                router::decode_rgb_leds(&data, leds)
            }
        }
    }

    /// Set all LEDs. `colors` must hold one entry per LED.
    pub async fn write_rgb(&self, colors: &[Rgb]) -> Result<()> {
        match self.config.rgb {
            RgbTopology::Embedded => {
                let mut state = self.read_system_state().await?;
                router::inject_rgb(&mut state, colors)?;
                self.write_system_state(&state).await
            }
            RgbTopology::Dedicated { leds } => {
                let data = router::encode_rgb_leds(colors, leds)?;
                self.write_raw(Characteristic::RgbLed, &data).await
            }
        }
    }

    pub async fn wifi_status(&self) -> Result<WifiStatus> {
        let data = self.read_raw(Characteristic::Wifi).await?;
        Ok(router::decode_wifi_status(&data))
    }

    /// Send Wi-Fi credentials. `None` leaves that setting as it is.
    pub async fn set_wifi(&self, ssid: Option<&str>, password: Option<&str>) -> Result<()> {
        let data = WifiConfig { ssid, password }.encode()?;
        self.write_raw(Characteristic::Wifi, &data).await
    }

    /// Ask the device to fetch and install firmware from `url`.
    pub async fn start_ota(&self, url: &str) -> Result<()> {
        info!("Starting OTA update from {url}");
        self.write_raw(Characteristic::Ota, url.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristic::CharacteristicTable;
    use crate::codec::WireFormat;
    use crate::error::Error;
    use crate::gatt::memory::MemoryGatt;
    use crate::update::{BlowerPidUpdate, SystemStateUpdate};
    use serde_json::json;

    const TABLE: CharacteristicTable = CharacteristicTable::FIRMWARE;

    fn client(rgb: RgbTopology) -> (ZellenradClient<MemoryGatt>, MemoryGatt) {
        let gatt = MemoryGatt::default();
        let config = ClientConfig {
            rgb,
            ..Default::default()
        };
        (ZellenradClient::new(gatt.clone(), config), gatt)
    }

    fn state() -> SystemState {
        SystemStateUpdate {
            state: Some(1),
            pressure1: Some(0.25),
            blower_pwm: Some(512),
            rgb: Some([Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]),
            encoder_count: Some(-100),
            blower_pulse_count: Some(7),
            ..Default::default()
        }
        .build()
    }

    #[tokio::test]
    async fn test_read_system_state() {
        let (client, gatt) = client(RgbTopology::Embedded);
        gatt.set(TABLE.system_state, state().encode());
        let read = client.read_system_state().await.unwrap();
        assert_eq!(read.to_json(), state().to_json());
        assert_eq!(gatt.reads(), 1);
    }

    #[tokio::test]
    async fn test_short_payload_is_size_mismatch() {
        let (client, gatt) = client(RgbTopology::Embedded);
        gatt.set(TABLE.manual_control, vec![0; 24]);
        let err = client.read_manual_control().await.unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { record: "ManualControl", .. }));
    }

    #[tokio::test]
    async fn test_partial_pid_write() {
        let (client, gatt) = client(RgbTopology::Embedded);
        let update = BlowerPidUpdate {
            kp: Some(2.0),
            ..Default::default()
        };
        client.write_blower_pid(&update.build()).await.unwrap();
        let writes = gatt.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, TABLE.blower_pid);
        assert_eq!(writes[0].1.len(), 72);
        assert_eq!(&writes[0].1[0..4], &2.0_f32.to_le_bytes());
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let (client, gatt) = client(RgbTopology::Embedded);
        gatt.break_link();
        let err = client.read_blower_pid().await.unwrap_err();
        match err {
            Error::Transport(e) => assert_eq!(e.to_string(), "link lost"),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(client.start_ota("http://x").await.is_err());
        assert!(gatt.writes().is_empty());
    }

    #[tokio::test]
    async fn test_rgb_embedded_read_modify_write() {
        let (client, gatt) = client(RgbTopology::Embedded);
        gatt.set(TABLE.system_state, state().encode());
        assert_eq!(
            client.read_rgb().await.unwrap(),
            vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]
        );

        client
            .write_rgb(&[Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)])
            .await
            .unwrap();
        let written = SystemState::decode(&gatt.get(TABLE.system_state).unwrap()).unwrap();
        assert_eq!(written.rgb, [Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]);
        assert_eq!(written.blower_pwm, 512);
        assert_eq!(written.encoder_count, -100);
        assert!(gatt.get(TABLE.rgb_led).is_none());
    }

    #[tokio::test]
    async fn test_rgb_wrong_count_writes_nothing() {
        let (client, gatt) = client(RgbTopology::Embedded);
        gatt.set(TABLE.system_state, state().encode());
        let err = client.write_rgb(&[Rgb::BLACK]).await.unwrap_err();
        assert!(matches!(err, Error::LedCount { expected: 2, actual: 1 }));
        assert!(gatt.writes().is_empty());
    }

    #[tokio::test]
    async fn test_rgb_dedicated() {
        let (client, gatt) = client(RgbTopology::Dedicated { leds: 3 });
        gatt.set(TABLE.rgb_led, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);
        assert_eq!(client.read_rgb().await.unwrap()[2], Rgb::new(3, 3, 3));

        client.write_rgb(&[Rgb::new(9, 8, 7); 3]).await.unwrap();
        assert_eq!(gatt.get(TABLE.rgb_led).unwrap(), vec![9, 8, 7, 9, 8, 7, 9, 8, 7]);
        assert_eq!(gatt.reads(), 1);
        assert!(gatt.get(TABLE.system_state).is_none());
    }

    #[tokio::test]
    async fn test_device_type_wifi_and_ota() {
        let (client, gatt) = client(RgbTopology::Embedded);
        gatt.set(TABLE.device_type, b"Zellenradschleuse".to_vec());
        gatt.set(TABLE.wifi, b"offline".to_vec());
        assert_eq!(client.device_type().await.unwrap(), "Zellenradschleuse");
        assert_eq!(
            client.wifi_status().await.unwrap(),
            WifiStatus::Raw {
                raw: "offline".to_string()
            }
        );

        client.set_wifi(Some("hall-3"), Some("secret")).await.unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&gatt.get(TABLE.wifi).unwrap()).unwrap(),
            json!({ "ssid": "hall-3", "password": "secret" })
        );
        assert!(matches!(client.wifi_status().await.unwrap(), WifiStatus::Json(_)));

        client.start_ota("https://updates.local/zrs.bin").await.unwrap();
        assert_eq!(gatt.get(TABLE.ota).unwrap(), b"https://updates.local/zrs.bin".to_vec());
    }

    #[tokio::test]
    async fn test_custom_table_is_used() {
        let gatt = MemoryGatt::default();
        let config = ClientConfig::from_json(
            r#"{ "characteristics": { "manual_control": "0000aaaa-0000-1000-8000-00805f9b34fb" } }"#,
        )
        .unwrap();
        let client = ZellenradClient::new(gatt.clone(), config);
        let mc = client.read_manual_control().await;
        assert!(matches!(mc, Err(Error::Transport(_))));

        gatt.set(
            "0000aaaa-0000-1000-8000-00805f9b34fb".parse().unwrap(),
            vec![0; ManualControl::WIRE_SIZE],
        );
        assert_eq!(client.read_manual_control().await.unwrap().feeder_seconds, 0.0);
    }
}
