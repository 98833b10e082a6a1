//! ecu-dashd - ECU telemetry dashboard daemon
//!
//! Polls the ECU over serial and feeds each cycle to one consumer:
//!
//! - **relay**: one CSV record per cycle (`afr,mat,coolant,map`) written to a
//!   downstream serial display
//! - **interactive**: one selected channel rendered per cycle, with a button
//!   cycling through the channel table
//!
//! ```text
//!   ECU ──serial──► Acquisition ──CycleResult──► RelayConsumer ──serial──► display
//!                                      │
//!                                      └───────► DisplayConsumer ──► Renderer
//!                                                      ▲
//!                      button ──► InputTask ──index────┘
//! ```

pub mod config;
pub mod display;
pub mod input;
pub mod relay;
pub mod render;
pub mod runner;
pub mod selection;

pub use config::{ConfigError, DashConfig, Mode, RendererKind};
pub use display::DisplayConsumer;
pub use input::{InputPin, NeverPressed, SysfsPin};
pub use relay::{format_record, RelayConsumer};
pub use render::{LogRenderer, Renderer, TextRenderer};
pub use runner::{InputTask, InteractiveMode, RelayMode};
pub use selection::{SelectionState, SelectionStateMachine, SharedSelection};
