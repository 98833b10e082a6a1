//! Link configuration
//!
//! Serial parameters and acquisition settings for the upstream ECU link.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters needed to open a serial port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path (e.g., "/dev/ttyUSB0")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Driver-level read/write timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Upstream ECU link and acquisition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcuLinkConfig {
    /// ECU serial device
    #[serde(default = "default_ecu_port")]
    pub port: String,

    /// ECU baud rate
    #[serde(default = "default_ecu_baud")]
    pub baud_rate: u32,

    /// Total time allowed to collect one response, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on bytes read per response
    #[serde(default = "default_max_read")]
    pub max_read: usize,

    /// Poll request token sent once per cycle
    #[serde(default = "default_request")]
    pub request: String,

    /// Override for the minimum valid frame length
    ///
    /// When unset, the channel table's furthest field decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_frame_len: Option<usize>,
}

fn default_ecu_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_ecu_baud() -> u32 {
    115200
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_max_read() -> usize {
    200
}

fn default_request() -> String {
    "A".to_string()
}

impl Default for EcuLinkConfig {
    fn default() -> Self {
        Self {
            port: default_ecu_port(),
            baud_rate: default_ecu_baud(),
            timeout_ms: default_timeout_ms(),
            max_read: default_max_read(),
            request: default_request(),
            min_frame_len: None,
        }
    }
}

impl EcuLinkConfig {
    /// Serial parameters for opening the ECU port
    pub fn serial(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            timeout_ms: self.timeout_ms,
        }
    }

    /// Response collection timeout
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Request token as bytes
    pub fn request_bytes(&self) -> Vec<u8> {
        self.request.as_bytes().to_vec()
    }
}
