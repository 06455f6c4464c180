//! Error types for the voucher bridge

use thiserror::Error;

/// Main error type for the voucher bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Remote platform error ({code}): {msg}")]
    RemoteLogicError { code: i64, msg: String },

    #[error("Unsupported form type: {0}")]
    UnsupportedFormType(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Publish error: {0}")]
    PublishError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::DecodeError(err.to_string())
    }
}
