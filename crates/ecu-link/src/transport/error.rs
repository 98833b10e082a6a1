//! Link layer errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Link unavailable: {0}")]
    Unavailable(String),

    #[error("Link closed")]
    Closed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
