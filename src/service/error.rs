//! Remote operation failure

use serde_json::Value;

/// A failed call to the remote service.
///
/// There is a single kind: the transport, validation, not-found and server
/// failures all end up here. `error` carries the payload the transport
/// produced (usually the JSON error body) so the UI can render it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
    pub error: Value,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            error: Value::String(message.clone()),
            message,
        }
    }

    pub fn with_payload(message: impl Into<String>, error: Value) -> Self {
        Self {
            message: message.into(),
            error,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::new(err.to_string())
    }
}

/// Result type for remote service calls
pub type ServiceResult<T> = Result<T, ServiceError>;
