//! Connect to the first feeder in range and print its state every few seconds.
//!
//! Set `ZELLENRAD_CONFIG` to a JSON config file to override the UUID table,
//! the LED layout or the device name. `RUST_LOG=zellenrad=debug` shows the
//! raw GATT traffic.

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use zellenrad::{BleTransport, ClientConfig, ZellenradClient};

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("ZELLENRAD_CONFIG") {
        Ok(path) => ClientConfig::from_json(&std::fs::read_to_string(path)?)?,
        Err(_) => ClientConfig::default(),
    };

    let transport = BleTransport::connect(&config).await?;
    let client = ZellenradClient::new(transport, config);
    println!("Device type: {}", client.device_type().await?);
    println!("Wi-Fi: {:?}", client.wifi_status().await?);

    for _ in 0..10 {
        let state = client.read_system_state().await?;
        println!("{}", state.to_json());
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    client.into_inner().stop().await
}
