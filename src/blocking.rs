//! Synchronous client for callers without an async runtime.
//!
//! The transport lives on a dedicated worker thread running a
//! current-thread tokio runtime. Calls hand a request to the worker over a
//! channel and block on a one-shot reply; the worker serves one request at
//! a time, in order. Encoding and decoding stay on the caller's thread.
//!
//! The methods block and must not be called from inside an async runtime.

use std::future::Future;
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::characteristic::{Characteristic, Routed};
use crate::config::{ClientConfig, RgbTopology};
use crate::error::{Error, Result};
use crate::gatt::Gatt;
use crate::record::{BlowerPid, ManualControl, Rgb, SystemState};
use crate::router::{self, WifiConfig, WifiStatus};

enum Request {
    Read {
        uuid: Uuid,
        reply: oneshot::Sender<anyhow::Result<Vec<u8>>>,
    },
    Write {
        uuid: Uuid,
        value: Vec<u8>,
        reply: oneshot::Sender<anyhow::Result<()>>,
    },
}

/// Blocking counterpart of [`ZellenradClient`](crate::ZellenradClient).
pub struct BlockingClient {
    requests: Option<mpsc::Sender<Request>>,
    worker: Option<JoinHandle<()>>,
    config: ClientConfig,
}

impl BlockingClient {
    const QUEUE_DEPTH: usize = 8;

    /// Start the worker and establish the transport on it.
    ///
    /// `connect` runs on the worker thread, so the transport never has to
    /// cross threads. Blocks until it has finished; its error is returned as
    /// [`Error::Transport`]. Failing to start the thread or its runtime is
    /// [`Error::WorkerStart`].
    pub fn spawn<G, F, Fut>(connect: F, config: ClientConfig) -> Result<Self>
    where
        G: Gatt + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<G>> + 'static,
    {
        let (requests, mut inbox) = mpsc::channel::<Request>(Self::QUEUE_DEPTH);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        let worker = std::thread::Builder::new()
            .name("zellenrad-gatt".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = ready_tx.send(Err(Error::WorkerStart(err)));
                        return;
                    }
                };
                runtime.block_on(async move {
                    let gatt = match connect().await {
                        Ok(gatt) => gatt,
                        Err(err) => {
                            let _ = ready_tx.send(Err(Error::Transport(err)));
                            return;
                        }
                    };
                    if ready_tx.send(Ok(())).is_err() {
                        return;
                    }
                    while let Some(request) = inbox.recv().await {
                        serve(&gatt, request).await;
                    }
                    debug!("GATT worker: request channel closed");
                });
            })
            .map_err(Error::WorkerStart)?;

        match ready_rx.blocking_recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = worker.join();
                return Err(err);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(Error::WorkerClosed);
            }
        }
        info!("GATT worker started");

        Ok(Self {
            requests: Some(requests),
            worker: Some(worker),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stop the worker. Requests already queued are served first.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn send(&self, request: Request) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or(Error::WorkerClosed)?
            .blocking_send(request)
            .map_err(|_| Error::WorkerClosed)
    }

    fn read_raw(&self, characteristic: Characteristic) -> Result<Vec<u8>> {
        let uuid = self.config.characteristics.uuid(characteristic);
        let (reply, response) = oneshot::channel();
        self.send(Request::Read { uuid, reply })?;
        let data = response.blocking_recv().map_err(|_| Error::WorkerClosed)??;
        router::log_rx(characteristic, uuid, &data);
        Ok(data)
    }

    fn write_raw(&self, characteristic: Characteristic, data: &[u8]) -> Result<()> {
        let uuid = self.config.characteristics.uuid(characteristic);
        router::log_tx(characteristic, uuid, data);
        let (reply, response) = oneshot::channel();
        self.send(Request::Write {
            uuid,
            value: data.to_vec(),
            reply,
        })?;
        response.blocking_recv().map_err(|_| Error::WorkerClosed)??;
        Ok(())
    }

    pub fn read<R: Routed>(&self) -> Result<R> {
        R::decode(&self.read_raw(R::CHARACTERISTIC)?)
    }

    pub fn write<R: Routed>(&self, record: &R) -> Result<()> {
        self.write_raw(R::CHARACTERISTIC, &record.encode())
    }

    pub fn device_type(&self) -> Result<String> {
        Ok(router::decode_device_type(&self.read_raw(Characteristic::DeviceType)?))
    }

    pub fn read_system_state(&self) -> Result<SystemState> {
        self.read()
    }

    pub fn write_system_state(&self, value: &SystemState) -> Result<()> {
        self.write(value)
    }

    pub fn read_manual_control(&self) -> Result<ManualControl> {
        self.read()
    }

    pub fn write_manual_control(&self, value: &ManualControl) -> Result<()> {
        self.write(value)
    }

    pub fn read_blower_pid(&self) -> Result<BlowerPid> {
        self.read()
    }

    pub fn write_blower_pid(&self, value: &BlowerPid) -> Result<()> {
        self.write(value)
    }

    pub fn read_rgb(&self) -> Result<Vec<Rgb>> {
        match self.config.rgb {
            RgbTopology::Embedded => Ok(self.read_system_state()?.rgb.to_vec()),
            RgbTopology::Dedicated { leds } => {
                router::decode_rgb_leds(&self.read_raw(Characteristic::RgbLed)?, leds)
            }
        }
    }

    pub fn write_rgb(&self, colors: &[Rgb]) -> Result<()> {
        match self.config.rgb {
            RgbTopology::Embedded => {
                let mut state = self.read_system_state()?;
                router::inject_rgb(&mut state, colors)?;
                self.write_system_state(&state)
            }
            RgbTopology::Dedicated { leds } => {
                let data = router::encode_rgb_leds(colors, leds)?;
                self.write_raw(Characteristic::RgbLed, &data)
            }
        }
    }

    pub fn wifi_status(&self) -> Result<WifiStatus> {
        Ok(router::decode_wifi_status(&self.read_raw(Characteristic::Wifi)?))
    }

    pub fn set_wifi(&self, ssid: Option<&str>, password: Option<&str>) -> Result<()> {
        let data = WifiConfig { ssid, password }.encode()?;
        self.write_raw(Characteristic::Wifi, &data)
    }

    pub fn start_ota(&self, url: &str) -> Result<()> {
        info!("Starting OTA update from {url}");
        self.write_raw(Characteristic::Ota, url.as_bytes())
    }
}

impl Drop for BlockingClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn serve<G: Gatt>(gatt: &G, request: Request) {
    // A caller that gave up on its reply is not an error for the worker.
    match request {
        Request::Read { uuid, reply } => {
            let _ = reply.send(gatt.read(uuid).await);
        }
        Request::Write { uuid, value, reply } => {
            let _ = reply.send(gatt.write(uuid, &value).await);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristic::CharacteristicTable;
    use crate::codec::WireFormat;
    use crate::gatt::memory::MemoryGatt;
    use crate::update::{BlowerPidUpdate, ManualControlUpdate};
    use anyhow::anyhow;

    const TABLE: CharacteristicTable = CharacteristicTable::FIRMWARE;

    fn spawn(gatt: &MemoryGatt, config: ClientConfig) -> BlockingClient {
        let gatt = gatt.clone();
        BlockingClient::spawn(move || async move { Ok(gatt) }, config).unwrap()
    }

    #[test]
    fn test_read_and_write_through_worker() {
        let gatt = MemoryGatt::default();
        let pid = BlowerPidUpdate {
            kp: Some(0.8),
            min_pwm_output: Some(20),
            ..Default::default()
        }
        .build();
        gatt.set(TABLE.blower_pid, pid.encode());

        let client = spawn(&gatt, ClientConfig::default());
        let read = client.read_blower_pid().unwrap();
        assert_eq!(read.to_json(), pid.to_json());

        let mc = ManualControlUpdate {
            feeder_seconds: Some(3.0),
            ..Default::default()
        }
        .build();
        client.write_manual_control(&mc).unwrap();
        client.close();

        let writes = gatt.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0], (TABLE.manual_control, mc.encode()));
    }

    #[test]
    fn test_connect_failure_is_reported() {
        let result = BlockingClient::spawn(
            || async { Err::<MemoryGatt, _>(anyhow!("adapter off")) },
            ClientConfig::default(),
        );
        match result {
            Err(Error::Transport(e)) => assert_eq!(e.to_string(), "adapter off"),
            Err(other) => panic!("expected transport error, got {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_worker_start_failure_is_not_a_transport_error() {
        let err = Error::WorkerStart(std::io::Error::other("no threads left"));
        assert_eq!(
            err.to_string(),
            "could not start transport worker: no threads left"
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(!matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_errors_propagate_from_worker() {
        let gatt = MemoryGatt::default();
        let client = spawn(&gatt, ClientConfig::default());
        gatt.set(TABLE.system_state, vec![0; 40]);
        assert!(matches!(
            client.read_system_state(),
            Err(Error::SizeMismatch { expected: 41, actual: 40, .. })
        ));
        gatt.break_link();
        assert!(matches!(client.device_type(), Err(Error::Transport(_))));
    }

    #[test]
    fn test_rgb_and_wifi() {
        let gatt = MemoryGatt::default();
        gatt.set(TABLE.rgb_led, vec![0; 6]);
        gatt.set(TABLE.wifi, br#"{"ssid":"hall-3"}"#.to_vec());
        let config = ClientConfig {
            rgb: RgbTopology::Dedicated { leds: 2 },
            ..Default::default()
        };
        let client = spawn(&gatt, config);

        client.write_rgb(&[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]).unwrap();
        assert_eq!(
            client.read_rgb().unwrap(),
            vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]
        );
        assert_eq!(
            client.wifi_status().unwrap(),
            WifiStatus::Json(serde_json::json!({ "ssid": "hall-3" }))
        );
        client.start_ota("http://fw").unwrap();
        assert_eq!(gatt.get(TABLE.ota).unwrap(), b"http://fw".to_vec());
    }

    #[test]
    fn test_requests_are_served_in_order() {
        let gatt = MemoryGatt::default();
        let client = spawn(&gatt, ClientConfig::default());
        for i in 0..20u8 {
            let ssid = format!("net-{i}");
            client.set_wifi(Some(ssid.as_str()), None).unwrap();
        }
        drop(client);
        let writes = gatt.writes();
        assert_eq!(writes.len(), 20);
        assert_eq!(writes[19].1, br#"{"ssid":"net-19"}"#.to_vec());
    }
}
