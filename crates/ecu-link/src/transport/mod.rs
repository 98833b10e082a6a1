//! Transport layer for ECU communication
//!
//! This module provides link adapters for talking to the ECU:
//! - Serial adapter over any async byte stream (tokio-serial in production)
//! - Mock adapter for testing and running without hardware
//!
//! # Example
//!
//! ```ignore
//! use ecu_link::transport::{create_link, LinkAdapter, LinkKind};
//!
//! let mut link = create_link(&LinkKind::Serial(config.serial()), &table)?;
//! link.send(b"A").await?;
//! ```

mod adapter;
pub mod error;
pub mod mock;
pub mod stream;

pub use adapter::LinkAdapter;
pub use error::LinkError;
pub use mock::{MockConfig, MockHandle, MockLink};
pub use stream::{open_serial, SerialLink, StreamLink};

use ecu_conv::ChannelTable;

use crate::config::SerialConfig;

/// Which adapter to build
#[derive(Debug, Clone)]
pub enum LinkKind {
    /// Serial port to a real ECU
    Serial(SerialConfig),
    /// Synthetic ECU producing frames for the channel table
    Mock(MockConfig),
}

/// Create a link adapter based on configuration
pub fn create_link(
    kind: &LinkKind,
    table: &ChannelTable,
) -> Result<Box<dyn LinkAdapter>, LinkError> {
    match kind {
        LinkKind::Serial(config) => {
            let link = SerialLink::open(config)?;
            Ok(Box::new(link))
        }
        LinkKind::Mock(config) => {
            let link = MockLink::synthetic(config.clone(), table.clone());
            Ok(Box::new(link))
        }
    }
}
