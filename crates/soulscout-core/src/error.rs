use thiserror::Error;

/// The five error kinds the decision pipeline and bus adapter can raise.
///
/// Transient I/O and bus-unavailable errors are meant to be retried by the
/// caller; malformed-message and insufficient-data are not retried (the
/// message is acked and dropped, or the signal falls back to a neutral
/// value) and config errors are fatal at startup.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("transient I/O error: {0}")]
    TransientIo(String),

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("stream bus unavailable: {0}")]
    BusUnavailable(String),
}

impl From<redis::RedisError> for CoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_timeout() || err.is_io_error() {
            CoreError::TransientIo(err.to_string())
        } else {
            CoreError::BusUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::MalformedMessage(err.to_string())
    }
}
