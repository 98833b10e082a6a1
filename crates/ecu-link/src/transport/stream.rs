//! Stream-backed link adapter
//!
//! Wraps any async byte stream. The serial port is the production stream;
//! tests use an in-memory duplex pipe.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::debug;

use super::{LinkAdapter, LinkError};
use crate::config::SerialConfig;

/// Link adapter over an async read/write stream
pub struct StreamLink<S> {
    stream: S,
    label: String,
}

/// Serial port link to the ECU
pub type SerialLink = StreamLink<SerialStream>;

impl<S> StreamLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, label: impl Into<String>) -> Self {
        Self {
            stream,
            label: label.into(),
        }
    }
}

impl SerialLink {
    /// Open the serial port described by `config`
    pub fn open(config: &SerialConfig) -> Result<Self, LinkError> {
        let stream = open_serial(config)?;
        Ok(Self::new(stream, config.port.clone()))
    }
}

/// Open a serial port as an async stream
///
/// Used for both the ECU link and the downstream relay sink.
pub fn open_serial(config: &SerialConfig) -> Result<SerialStream, LinkError> {
    if config.baud_rate == 0 {
        return Err(LinkError::InvalidConfig(format!(
            "baud rate for {} must be non-zero",
            config.port
        )));
    }

    let stream = tokio_serial::new(&config.port, config.baud_rate)
        .timeout(Duration::from_millis(config.timeout_ms))
        .open_native_async()
        .map_err(|e| LinkError::Unavailable(format!("{}: {}", config.port, e)))?;

    debug!(port = %config.port, baud = config.baud_rate, "Serial port opened");
    Ok(stream)
}

#[async_trait]
impl<S> LinkAdapter for StreamLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, request: &[u8]) -> Result<(), LinkError> {
        self.stream
            .write_all(request)
            .await
            .map_err(|e| LinkError::SendFailed(e.to_string()))?;
        self.stream
            .flush()
            .await
            .map_err(|e| LinkError::SendFailed(e.to_string()))
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.stream.read(buf).await {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Err(LinkError::Timeout(e.to_string()))
            }
            Err(e) => Err(LinkError::ReceiveFailed(e.to_string())),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
