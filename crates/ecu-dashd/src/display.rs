//! Display consumer
//!
//! Decodes only the selected channel and hands it to the renderer. Cycles
//! without data leave the previous reading on screen.

use ecu_conv::{decode, ChannelTable};
use ecu_link::CycleResult;
use tracing::{debug, warn};

use crate::render::Renderer;

pub struct DisplayConsumer<R> {
    table: ChannelTable,
    renderer: R,
}

impl<R: Renderer> DisplayConsumer<R> {
    pub fn new(table: ChannelTable, renderer: R) -> Self {
        Self { table, renderer }
    }

    pub fn table(&self) -> &ChannelTable {
        &self.table
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Handle one cycle; returns true when the renderer was called
    pub fn on_cycle(&mut self, result: &CycleResult, index: usize) -> bool {
        let Some(frame) = result.frame() else {
            return false;
        };

        let Some(channel) = self.table.get(index) else {
            warn!(index, "Selected channel index out of range");
            return false;
        };

        let value = match decode(frame, channel) {
            Ok(value) => value,
            Err(e) => {
                debug!(channel = %channel.name, error = %e, "Skipping display update");
                return false;
            }
        };

        if let Err(e) = self.renderer.render(value.name(), value.physical_value) {
            warn!(error = %e, "Render failed");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, f64)>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, name: &str, value: f64) -> io::Result<()> {
            self.calls.push((name.to_string(), value));
            Ok(())
        }
    }

    fn frame() -> Vec<u8> {
        let mut frame = vec![0u8; 32];
        frame[22..24].copy_from_slice(&[0x00, 0x64]); // coolant 4.44
        frame[28..30].copy_from_slice(&147i16.to_be_bytes()); // afr 14.7
        frame
    }

    #[test]
    fn test_renders_selected_channel_only() {
        let mut display = DisplayConsumer::new(ChannelTable::reference(), Recorder::default());

        assert!(display.on_cycle(&CycleResult::Data(frame()), 0));
        assert!(display.on_cycle(&CycleResult::Data(frame()), 2));

        let calls = &display.renderer().calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "coolant");
        assert!((calls[0].1 - 4.44).abs() < 1e-9);
        assert_eq!(calls[1].0, "afr1");
        assert!((calls[1].1 - 14.7).abs() < 1e-9);
    }

    #[test]
    fn test_empty_cycle_does_not_render() {
        let mut display = DisplayConsumer::new(ChannelTable::reference(), Recorder::default());

        assert!(!display.on_cycle(&CycleResult::Empty, 0));
        assert!(display.renderer().calls.is_empty());
    }

    #[test]
    fn test_short_frame_does_not_render() {
        let mut display = DisplayConsumer::new(ChannelTable::reference(), Recorder::default());

        // map at offset 18 fits, afr1 at offset 28 does not
        let result = CycleResult::Data(vec![0u8; 24]);
        assert!(display.on_cycle(&result, 3));
        assert!(!display.on_cycle(&result, 2));
        assert_eq!(display.renderer().calls.len(), 1);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut display = DisplayConsumer::new(ChannelTable::reference(), Recorder::default());
        assert!(!display.on_cycle(&CycleResult::Data(frame()), 4));
    }
}
