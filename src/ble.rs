//! [`Gatt`] over the platform Bluetooth stack, via `bluest`.

use std::collections::HashMap;

use anyhow::anyhow;
use bluest::Adapter;
use bluest::AdvertisingDevice;
use bluest::Characteristic as GattCharacteristic;
use bluest::Device;
use futures_util::StreamExt;
use tokio::time::timeout;
use tracing::{debug, info};
use uuid::Uuid;

use crate::characteristic::{Characteristic, CharacteristicTable};
use crate::config::ClientConfig;
use crate::gatt::Gatt;

/// A connected feeder.
///
/// The Metexon service and the characteristics of the configured table are
/// discovered once on connect. Characteristics a firmware revision does not
/// expose (e.g. the dedicated RGB one) are skipped; using them later fails
/// with a transport error.
pub struct BleTransport {
    adapter: Adapter,
    device: Device,
    characteristics: HashMap<Uuid, GattCharacteristic>,
}

impl BleTransport {
    /// Scan for a device advertising the Metexon service (and the configured
    /// name, if any) and connect to it.
    pub async fn connect(config: &ClientConfig) -> anyhow::Result<Self> {
        let adapter = Adapter::default()
            .await
            .ok_or(anyhow!("Default adapter not found"))?;
        adapter.wait_available().await?;

        let device = timeout(config.scan_timeout(), Self::discover_device(&adapter, config))
            .await
            .map_err(|_| anyhow!("Device not found"))??;

        adapter.connect_device(&device.device).await?;
        info!("Connected to {:?}", device.device.id());

        Self::attach(adapter, device.device, &config.characteristics).await
    }

    /// Use a device that is already known and connected.
    pub async fn attach(
        adapter: Adapter,
        device: Device,
        table: &CharacteristicTable,
    ) -> anyhow::Result<Self> {
        let service = device
            .discover_services_with_uuid(table.service)
            .await?
            .first()
            .ok_or(anyhow!("The device does not offer the Metexon service."))?
            .clone();

        let mut characteristics = HashMap::new();
        for characteristic in Characteristic::ALL {
            let uuid = table.uuid(characteristic);
            match service.discover_characteristics_with_uuid(uuid).await?.first() {
                Some(c) => {
                    characteristics.insert(uuid, c.clone());
                }
                None => debug!(?characteristic, %uuid, "characteristic not exposed"),
            }
        }

        Ok(Self {
            adapter,
            device,
            characteristics,
        })
    }

    /// Disconnect from the device
    pub async fn stop(self) -> anyhow::Result<()> {
        self.adapter.disconnect_device(&self.device).await?;
        Ok(())
    }

    async fn discover_device(
        adapter: &Adapter,
        config: &ClientConfig,
    ) -> anyhow::Result<AdvertisingDevice> {
        let required_services = [config.characteristics.service];
        let mut adapter_events = adapter.scan(&required_services).await?;
        while let Some(device) = adapter_events.next().await {
            let Some(wanted) = config.device_name.as_deref() else {
                return Ok(device);
            };
            if name_matches(device.device.name_async().await, wanted) {
                return Ok(device);
            }
        }

        Err(anyhow!("Device not found"))
    }

    fn characteristic(&self, uuid: Uuid) -> anyhow::Result<&GattCharacteristic> {
        self.characteristics
            .get(&uuid)
            .ok_or(anyhow!("The device does not expose characteristic {uuid}"))
    }

    async fn ensure_connected(&self) -> anyhow::Result<()> {
        if !self.device.is_connected().await {
            self.adapter.connect_device(&self.device).await?;
        }
        Ok(())
    }
}

/// An advertiser whose name cannot be read is skipped, not fatal to the scan.
fn name_matches<E: std::fmt::Display>(name: Result<String, E>, wanted: &str) -> bool {
    match name {
        Ok(name) => {
            debug!("Found {name}");
            name == wanted
        }
        Err(err) => {
            debug!("Skipping advertiser without a readable name: {err}");
            false
        }
    }
}

impl Gatt for BleTransport {
    async fn read(&self, uuid: Uuid) -> anyhow::Result<Vec<u8>> {
        let characteristic = self.characteristic(uuid)?;
        self.ensure_connected().await?;
        Ok(characteristic.read().await?)
    }

    async fn write(&self, uuid: Uuid, value: &[u8]) -> anyhow::Result<()> {
        let characteristic = self.characteristic(uuid)?;
        self.ensure_connected().await?;
        characteristic.write(value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches() {
        assert!(name_matches::<&str>(Ok("ZRS-7".to_string()), "ZRS-7"));
        assert!(!name_matches::<&str>(Ok("ZRS-8".to_string()), "ZRS-7"));
        assert!(!name_matches(Err::<String, _>("name unavailable"), "ZRS-7"));
    }
}
