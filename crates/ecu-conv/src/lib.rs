//! ecu-conv - Channel decoding for ECU telemetry frames
//!
//! The ECU answers a poll with a fixed-layout binary frame. Each channel is a
//! signed 16-bit big-endian field at a known byte offset, converted to a
//! physical value with an affine transform.
//!
//! # Quick Start
//!
//! ```rust
//! use ecu_conv::{decode, ChannelTable};
//!
//! let table = ChannelTable::reference();
//! let coolant = table.by_name("coolant").unwrap();
//!
//! // Raw 100 at offset 22 → 100 * 0.02 + 2.44 = 4.44
//! let mut frame = vec![0u8; 32];
//! frame[22] = 0x00;
//! frame[23] = 0x64;
//!
//! let value = decode(&frame, coolant).unwrap();
//! assert_eq!(value.raw_value, 100);
//! assert!((value.physical_value - 4.44).abs() < 1e-9);
//! ```
//!
//! # YAML Channel Files
//!
//! ```yaml
//! meta:
//!   name: Speeduino
//!
//! channels:
//!   - name: coolant
//!     offset: 22
//!     scale: 0.02
//!     add: 2.44
//!     precision: 0
//!     unit: °C
//! ```

pub mod channel;
pub mod decode;
pub mod error;
pub mod precision;

pub use channel::{ChannelDescriptor, ChannelTable, TableMeta};
pub use decode::{decode, encode_physical, read_i16_be, DecodedChannel, FIELD_WIDTH};
pub use error::{ConvError, ConvResult};
pub use precision::{format_value, precision_from_scale};
