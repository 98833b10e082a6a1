//! ecu-link - Serial request/response link to the ECU
//!
//! This crate owns everything between the serial port and a raw frame:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Acquisition                  │
//! │  request token → collect bytes → classify    │
//! │                      │                       │
//! │              ┌───────┴───────┐               │
//! │              │  LinkAdapter  │               │
//! │              │ (serial/mock) │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Decoding of the returned frame lives in `ecu-conv`.

pub mod acquisition;
pub mod config;
pub mod device;
pub mod transport;

pub use acquisition::{cadence, Acquisition, CycleResult};
pub use config::{EcuLinkConfig, SerialConfig};
pub use device::wait_for_path;
pub use transport::{
    create_link, open_serial, LinkAdapter, LinkError, LinkKind, MockConfig, MockHandle, MockLink,
    SerialLink, StreamLink,
};
