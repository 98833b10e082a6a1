//! Decoding raw frame bytes to channel values
//!
//! Every channel is a signed 16-bit big-endian field. Decoding is pure:
//! the same frame and descriptor always produce the same value.

use crate::channel::ChannelDescriptor;
use crate::error::{ConvError, ConvResult};

/// Width in bytes of every channel field
pub const FIELD_WIDTH: usize = 2;

/// A channel value decoded from one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedChannel<'a> {
    pub descriptor: &'a ChannelDescriptor,
    /// Two's-complement value read from the frame
    pub raw_value: i16,
    /// raw_value * scale + additive_offset
    pub physical_value: f64,
}

impl DecodedChannel<'_> {
    /// Channel name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Physical value formatted with the channel's display precision
    pub fn formatted(&self) -> String {
        crate::precision::format_value(self.physical_value, self.descriptor.display_precision())
    }
}

/// Decode one channel from a frame
pub fn decode<'a>(
    frame: &[u8],
    descriptor: &'a ChannelDescriptor,
) -> ConvResult<DecodedChannel<'a>> {
    let raw_value = read_i16_be(frame, descriptor.byte_offset)?;
    let physical_value = raw_value as f64 * descriptor.scale + descriptor.additive_offset;

    Ok(DecodedChannel {
        descriptor,
        raw_value,
        physical_value,
    })
}

/// Read a big-endian signed 16-bit value at the given byte offset
pub fn read_i16_be(frame: &[u8], offset: usize) -> ConvResult<i16> {
    check_length(frame, offset, FIELD_WIDTH)?;
    Ok(i16::from_be_bytes([frame[offset], frame[offset + 1]]))
}

/// Encode a physical value back into raw field bytes
///
/// Used to build synthetic frames; values outside the i16 range saturate.
pub fn encode_physical(descriptor: &ChannelDescriptor, physical: f64) -> [u8; FIELD_WIDTH] {
    let raw = ((physical - descriptor.additive_offset) / descriptor.scale).round();
    let raw = raw.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
    raw.to_be_bytes()
}

fn check_length(frame: &[u8], offset: usize, required: usize) -> ConvResult<()> {
    let expected = offset.saturating_add(required);
    if expected > frame.len() {
        Err(ConvError::FrameTooShort {
            expected,
            actual: frame.len(),
        })
    } else {
        Ok(())
    }
}
