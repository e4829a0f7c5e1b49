//! Tagged stream elements and the encoded frame stream.
//!
//! Every element of the encoded stream ultimately becomes one UDP datagram
//! whose *length* is the signal. The protocol distinguishes two classes:
//!
//! - **Control** elements — header nibbles and per-frame CRC/sequence
//!   values, already carrying their marker bits (`0x10`–`0x40` for the
//!   header, `0x80` for frame control).
//! - **Data** elements — raw credential bytes. Their documented tagged value
//!   is `byte + 0x100`, distinguishing them from control elements for the
//!   receiving firmware's decoder tables.
//!
//! The tag is kept as an explicit variant rather than baked into a single
//! integer; the wire length for either class is `tagged value mod 256`,
//! applied only at the broadcast boundary.

use serde::{Deserialize, Serialize};

/// Marker OR-ed into the high nibble of the total length.
pub const LENGTH_HIGH_TAG: u8 = 0x10;
/// Marker OR-ed into the low nibble of the total length.
pub const LENGTH_LOW_TAG: u8 = 0x20;
/// Marker OR-ed into the high nibble of the length CRC.
pub const CRC_HIGH_TAG: u8 = 0x30;
/// Marker OR-ed into the low nibble of the length CRC.
pub const CRC_LOW_TAG: u8 = 0x40;
/// Marker OR-ed into frame CRC and sequence elements.
pub const FRAME_CONTROL_TAG: u8 = 0x80;
/// Marker added to data elements in their documented tagged value.
pub const DATA_TAG: u16 = 0x100;

/// Number of elements in the stream header.
pub const HEADER_ELEMENTS: usize = 4;
/// Number of elements per frame: CRC, sequence, four data bytes.
pub const FRAME_ELEMENTS: usize = 6;
/// Raw credential bytes covered by one frame.
pub const FRAME_DATA_BYTES: usize = 4;

/// One element of the encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodedElement {
    /// A header or frame-control value with its marker bits already set.
    Control(u8),
    /// A raw credential byte; tagged value is `byte + 0x100`.
    Data(u8),
}

impl EncodedElement {
    /// The documented tagged value, preserving the data/control distinction.
    pub fn tagged_value(self) -> u16 {
        match self {
            EncodedElement::Control(value) => u16::from(value),
            EncodedElement::Data(byte) => u16::from(byte) + DATA_TAG,
        }
    }

    /// The literal datagram byte length sent over the wire.
    ///
    /// This is `tagged_value() mod 256` — the tag never reaches the wire.
    pub fn wire_length(self) -> usize {
        (self.tagged_value() % 256) as usize
    }
}

/// The ordered element sequence produced by one `encode` call.
///
/// Layout: a 4-element header, then `FRAME_ELEMENTS`-element groups
/// `[crc, sequence, data0..data3]`. Read-only after creation; the broadcast
/// engine consumes it by iterating, it is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrameStream {
    elements: Vec<EncodedElement>,
}

impl EncodedFrameStream {
    /// Wraps an element sequence. Crate-internal; only the encoder builds
    /// streams.
    pub(crate) fn new(elements: Vec<EncodedElement>) -> Self {
        Self { elements }
    }

    /// All elements in transmission order.
    pub fn elements(&self) -> &[EncodedElement] {
        &self.elements
    }

    /// Total element count (header plus all frames).
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the stream holds no elements. Never the case for encoder
    /// output, which always carries at least the header.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The four header elements.
    pub fn header(&self) -> &[EncodedElement] {
        &self.elements[..HEADER_ELEMENTS.min(self.elements.len())]
    }

    /// Iterates over the frame groups following the header.
    pub fn frames(&self) -> impl Iterator<Item = &[EncodedElement]> {
        self.elements[HEADER_ELEMENTS.min(self.elements.len())..].chunks(FRAME_ELEMENTS)
    }
}

impl<'a> IntoIterator for &'a EncodedFrameStream {
    type Item = &'a EncodedElement;
    type IntoIter = std::slice::Iter<'a, EncodedElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
