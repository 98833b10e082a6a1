//! Channel descriptors and the channel table
//!
//! A channel is a named physical quantity stored as a signed 16-bit
//! big-endian field at a fixed byte offset of the ECU frame.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decode::{self, DecodedChannel, FIELD_WIDTH};
use crate::error::{ConvError, ConvResult};
use crate::precision::precision_from_scale;

/// Layout and scaling for one channel: physical = raw * scale + add
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Channel name (e.g., "coolant", "afr1")
    pub name: String,

    /// Byte offset of the 16-bit field within the frame
    #[serde(rename = "offset", alias = "byte_offset")]
    pub byte_offset: usize,

    /// Scale factor
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Additive offset
    #[serde(default, rename = "add", alias = "additive_offset")]
    pub additive_offset: f64,

    /// Decimal places used when the value is rendered as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,

    /// Unit string (e.g., "°C", "kPa")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

fn default_scale() -> f64 {
    1.0
}

impl ChannelDescriptor {
    /// Create a channel with the given layout and scaling
    pub fn new(
        name: impl Into<String>,
        byte_offset: usize,
        scale: f64,
        additive_offset: f64,
    ) -> Self {
        Self {
            name: name.into(),
            byte_offset,
            scale,
            additive_offset,
            precision: None,
            unit: None,
        }
    }

    /// Set an explicit display precision
    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set the unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Decimal places for display, falling back to the scale's natural precision
    pub fn display_precision(&self) -> u8 {
        self.precision
            .unwrap_or_else(|| precision_from_scale(self.scale))
    }

    /// Smallest frame length that holds this channel's field
    pub fn required_len(&self) -> usize {
        self.byte_offset.saturating_add(FIELD_WIDTH)
    }
}

/// Ordered, non-empty list of channels
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChannelTable {
    channels: Vec<ChannelDescriptor>,
    #[serde(skip)]
    meta: Option<TableMeta>,
}

/// On-disk layout of a channel definition file
#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    meta: Option<TableMeta>,
    channels: Vec<ChannelDescriptor>,
}

/// Optional metadata at the top of a channel definition file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    /// ECU or firmware name the table was written for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ChannelTable {
    /// Build a table, rejecting empty tables, duplicate names and offsets
    /// whose field would end past `usize::MAX`
    pub fn new(channels: Vec<ChannelDescriptor>) -> ConvResult<Self> {
        if channels.is_empty() {
            return Err(ConvError::EmptyTable);
        }

        for (i, channel) in channels.iter().enumerate() {
            if channel.byte_offset.checked_add(FIELD_WIDTH).is_none() {
                return Err(ConvError::OffsetOutOfRange {
                    name: channel.name.clone(),
                    offset: channel.byte_offset,
                });
            }
            if channels[..i].iter().any(|c| c.name == channel.name) {
                return Err(ConvError::DuplicateChannel(channel.name.clone()));
            }
        }

        Ok(Self {
            channels,
            meta: None,
        })
    }

    /// The reference table for the supported ECU firmware
    pub fn reference() -> Self {
        Self {
            channels: vec![
                ChannelDescriptor::new("coolant", 22, 0.02, 2.44)
                    .with_precision(0)
                    .with_unit("°C"),
                ChannelDescriptor::new("mat", 20, 0.02, 7.06)
                    .with_precision(0)
                    .with_unit("°C"),
                ChannelDescriptor::new("afr1", 28, 0.1, 0.0).with_precision(1),
                ChannelDescriptor::new("map", 18, 0.1, 0.0).with_precision(2),
            ],
            meta: None,
        }
    }

    /// Load a table from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConvResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load a table from a YAML string
    pub fn from_yaml(yaml: &str) -> ConvResult<Self> {
        let file: TableFile = serde_yaml::from_str(yaml)?;
        let mut table = Self::new(file.channels)?;
        table.meta = file.meta;
        Ok(table)
    }

    /// Metadata from the definition file, if the table was loaded from one
    pub fn meta(&self) -> Option<&TableMeta> {
        self.meta.as_ref()
    }

    /// Number of channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel at a position
    pub fn get(&self, index: usize) -> Option<&ChannelDescriptor> {
        self.channels.get(index)
    }

    /// Channel by name
    pub fn by_name(&self, name: &str) -> Option<&ChannelDescriptor> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Position of a channel by name
    pub fn index_of(&self, name: &str) -> ConvResult<usize> {
        self.channels
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ConvError::UnknownChannel(name.to_string()))
    }

    /// Iterate channels in table order
    pub fn iter(&self) -> impl Iterator<Item = &ChannelDescriptor> {
        self.channels.iter()
    }

    /// Minimum frame length needed to decode every channel
    pub fn min_frame_len(&self) -> usize {
        self.channels
            .iter()
            .map(ChannelDescriptor::required_len)
            .max()
            .unwrap_or(FIELD_WIDTH)
    }

    /// Decode every channel in table order
    pub fn decode_all(&self, frame: &[u8]) -> ConvResult<Vec<DecodedChannel<'_>>> {
        self.channels
            .iter()
            .map(|channel| decode::decode(frame, channel))
            .collect()
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl<'a> IntoIterator for &'a ChannelTable {
    type Item = &'a ChannelDescriptor;
    type IntoIter = std::slice::Iter<'a, ChannelDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}
