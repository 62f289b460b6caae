use uuid::Uuid;

/// The BLE stack as seen by the clients: whole-value reads and writes of a
/// characteristic by UUID.
///
/// One call is one GATT request. Implementations report their own failures
/// through `anyhow`; the clients pass them on untouched as
/// [`Error::Transport`](crate::Error::Transport) and never retry.
#[allow(async_fn_in_trait)]
pub trait Gatt {
    async fn read(&self, uuid: Uuid) -> anyhow::Result<Vec<u8>>;

    async fn write(&self, uuid: Uuid, value: &[u8]) -> anyhow::Result<()>;
}
