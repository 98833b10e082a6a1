//! Rendering collaborators for interactive mode
//!
//! The display consumer hands over a channel name and a physical value.
//! How that reaches pixels is up to the renderer.

use std::collections::HashMap;
use std::io::{self, Write};

use ecu_conv::{format_value, ChannelTable};
use tracing::info;

/// Receives the selected channel's value once per cycle
pub trait Renderer: Send {
    fn render(&mut self, name: &str, value: f64) -> io::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, name: &str, value: f64) -> io::Result<()> {
        (**self).render(name, value)
    }
}

/// Display settings for one channel
struct TextFormat {
    precision: u8,
    unit: Option<String>,
}

/// Writes `name: value [unit]` lines using each channel's display precision
pub struct TextRenderer<W> {
    out: W,
    formats: HashMap<String, TextFormat>,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W, table: &ChannelTable) -> Self {
        let formats = table
            .iter()
            .map(|c| {
                let format = TextFormat {
                    precision: c.display_precision(),
                    unit: c.unit.clone(),
                };
                (c.name.clone(), format)
            })
            .collect();
        Self { out, formats }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&mut self, name: &str, value: f64) -> io::Result<()> {
        let format = self.formats.get(name);
        let precision = format.map_or(2, |f| f.precision);
        let value = format_value(value, precision);

        match format.and_then(|f| f.unit.as_deref()) {
            Some(unit) => writeln!(self.out, "{}: {} {}", name, value, unit)?,
            None => writeln!(self.out, "{}: {}", name, value)?,
        }
        self.out.flush()
    }
}

/// Emits the value as a tracing event
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render(&mut self, name: &str, value: f64) -> io::Result<()> {
        info!(channel = name, value, "Display");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecu_conv::ChannelDescriptor;

    #[test]
    fn test_text_renderer_uses_channel_precision() {
        let table = ChannelTable::reference();
        let mut renderer = TextRenderer::new(Vec::new(), &table);

        renderer.render("afr1", 147.0 * 0.1).unwrap();
        renderer.render("coolant", 89.6).unwrap();
        renderer.render("unknown", 1.0).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "afr1: 14.7\ncoolant: 90 °C\nunknown: 1.00\n");
    }

    #[test]
    fn test_text_renderer_appends_unit() {
        let table = ChannelTable::new(vec![
            ChannelDescriptor::new("map", 18, 0.1, 0.0)
                .with_precision(1)
                .with_unit("kPa"),
            ChannelDescriptor::new("rpm", 14, 1.0, 0.0),
        ])
        .unwrap();
        let mut renderer = TextRenderer::new(Vec::new(), &table);

        renderer.render("map", 101.34).unwrap();
        renderer.render("rpm", 3200.0).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "map: 101.3 kPa\nrpm: 3200\n");
    }

    #[test]
    fn test_log_renderer() {
        assert!(LogRenderer.render("map", 101.3).is_ok());
    }
}
