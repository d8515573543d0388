use thiserror::Error;

/// Errors that can occur while parsing or routing relay events
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Dispatcher queue closed")]
    QueueClosed,
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        RouterError::Serialization(err.to_string())
    }
}
