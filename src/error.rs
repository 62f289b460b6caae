/// Errors surfaced by the codec, the router and the clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A payload did not have the exact wire size of the record it was decoded as.
    #[error("{record} expected {expected} bytes, got {actual}")]
    SizeMismatch {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    /// An RGB write carried a different number of colours than the device has LEDs.
    #[error("expected {expected} LED colours, got {actual}")]
    LedCount { expected: usize, actual: usize },
    /// The GATT transport failed. The transport's own error is kept as-is.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
    /// A sparse JSON update or configuration document could not be read.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The blocking client could not start its transport worker.
    #[error("could not start transport worker: {0}")]
    WorkerStart(#[source] std::io::Error),
    /// The blocking client's transport worker is gone.
    #[error("transport worker has shut down")]
    WorkerClosed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
