//! Error types for channel decoding

use thiserror::Error;

/// Errors that can occur while building a channel table or decoding a frame
#[derive(Debug, Error)]
pub enum ConvError {
    /// Frame too short for the channel's 16-bit field
    #[error("frame too short: expected {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    /// Channel table has no entries
    #[error("channel table is empty")]
    EmptyTable,

    /// Two channels share a name
    #[error("duplicate channel name: {0}")]
    DuplicateChannel(String),

    /// Channel offset leaves no room for its field
    #[error("channel {name}: offset {offset} out of range")]
    OffsetOutOfRange { name: String, offset: usize },

    /// Channel name not present in the table
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for channel operations
pub type ConvResult<T> = Result<T, ConvError>;
