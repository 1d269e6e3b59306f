//! Bit-level access to signals inside a frame buffer.
//!
//! Bits are addressed the standard way: bit `b` is bit `b % 8` (LSB = 0) of
//! byte `b / 8`.
//!
//! - Little-endian (Intel) signals start at their least significant bit and
//!   walk upward, continuing at bit 0 of the next byte.
//! - Big-endian (Motorola) signals start at their most significant bit and
//!   walk downward, continuing at bit 7 of the next byte.
//!
//! A [`BitLayout`] precomputes the byte spans a signal covers. Extraction and
//! insertion both walk the same spans, so they are inverses by construction.
//! Nothing here allocates.

use crate::types::{ByteOrder, mask};

/// Most spans a signal of up to 64 bits can cover.
pub const MAX_SPANS: usize = 9;

/// One run of bits within a single byte of the frame.
///
/// "Take `num_bits` bits starting at `bit_offset` of `data[byte_index]` and
/// place them at `value_shift` in the raw value."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitSpan {
    /// Frame byte holding this run
    pub byte_index: usize,
    /// Lowest bit of the run within the byte (0..=7)
    pub bit_offset: u8,
    /// Bits in the run (1..=8)
    pub num_bits: u8,
    /// Position of the run's lowest bit in the raw value
    pub value_shift: u8,
}

impl BitSpan {
    #[inline]
    fn byte_mask(&self) -> u8 {
        (((1u16 << self.num_bits) - 1) as u8) << self.bit_offset
    }
}

/// Precomputed mapping from a signal's declared position to frame bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitLayout {
    spans: [BitSpan; MAX_SPANS],
    count: usize,
    length: u16,
}

/// Convert between standard (LSB-0) bit numbering and the sequential MSB-0
/// numbering Motorola signals walk through. The mapping is its own inverse.
#[inline]
pub const fn msb0_index(bit: usize) -> usize {
    (bit / 8) * 8 + (7 - bit % 8)
}

impl BitLayout {
    /// Compute the layout of a signal in a frame of `frame_len` bytes.
    ///
    /// Returns `None` when `length` is outside 1..=64 or any bit of the
    /// signal would fall outside the frame.
    pub fn new(
        start_bit: u16,
        length: u16,
        byte_order: ByteOrder,
        frame_len: usize,
    ) -> Option<Self> {
        if length == 0 || length > 64 {
            return None;
        }
        let frame_bits = frame_len * 8;
        let start = start_bit as usize;
        let len = length as usize;

        match byte_order {
            ByteOrder::LittleEndian => {
                if start + len > frame_bits {
                    return None;
                }
                Some(Self::little_endian(start, length))
            }
            ByteOrder::BigEndian => {
                if start >= frame_bits || msb0_index(start) + len > frame_bits {
                    return None;
                }
                Some(Self::big_endian(start, length))
            }
        }
    }

    fn little_endian(start: usize, length: u16) -> Self {
        let mut layout = Self::empty(length);
        let mut byte_index = start / 8;
        let mut bit_index = (start % 8) as u8;
        let mut remaining = length;
        let mut value_shift = 0u8;

        while remaining > 0 {
            let num_bits = (8 - bit_index as u16).min(remaining) as u8;
            layout.push(BitSpan {
                byte_index,
                bit_offset: bit_index,
                num_bits,
                value_shift,
            });
            value_shift += num_bits;
            remaining -= num_bits as u16;
            byte_index += 1;
            bit_index = 0;
        }
        layout
    }

    fn big_endian(start: usize, length: u16) -> Self {
        let mut layout = Self::empty(length);
        let mut byte_index = start / 8;
        let mut bit_index = (start % 8) as u8;
        let mut remaining = length;

        // First span holds the most significant bits.
        while remaining > 0 {
            let num_bits = (bit_index as u16 + 1).min(remaining) as u8;
            let bit_offset = bit_index + 1 - num_bits;
            remaining -= num_bits as u16;
            layout.push(BitSpan {
                byte_index,
                bit_offset,
                num_bits,
                value_shift: remaining as u8,
            });
            byte_index += 1;
            bit_index = 7;
        }
        layout
    }

    fn empty(length: u16) -> Self {
        Self {
            spans: [BitSpan::default(); MAX_SPANS],
            count: 0,
            length,
        }
    }

    #[inline]
    fn push(&mut self, span: BitSpan) {
        self.spans[self.count] = span;
        self.count += 1;
    }

    /// The spans covered by the signal, in the order they were walked.
    #[inline]
    pub fn spans(&self) -> &[BitSpan] {
        &self.spans[..self.count]
    }

    /// Signal length in bits.
    #[inline]
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Number of frame bytes the layout requires.
    pub fn required_len(&self) -> usize {
        self.spans()
            .iter()
            .map(|s| s.byte_index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Read the signal's bits as an unsigned integer.
    ///
    /// `data` must be at least [`required_len`](Self::required_len) bytes.
    #[inline]
    pub fn extract(&self, data: &[u8]) -> u64 {
        let mut value = 0u64;
        for span in self.spans() {
            let bits = (data[span.byte_index] & span.byte_mask()) >> span.bit_offset;
            value |= (bits as u64) << span.value_shift;
        }
        value
    }

    /// Write the low `length` bits of `bits` into the signal's position.
    ///
    /// Only the signal's own bits change; every other bit of `data` is kept.
    #[inline]
    pub fn insert(&self, data: &mut [u8], bits: u64) {
        let bits = bits & mask(self.length);
        for span in self.spans() {
            let byte_mask = span.byte_mask();
            let chunk = ((bits >> span.value_shift) as u8) << span.bit_offset;
            let byte = &mut data[span.byte_index];
            *byte = (*byte & !byte_mask) | (chunk & byte_mask);
        }
    }
}

/// Extract a raw signal value from frame data.
///
/// Returns `None` if the signal does not fit in `data`.
#[inline]
pub fn extract_raw(data: &[u8], start_bit: u16, length: u16, byte_order: ByteOrder) -> Option<u64> {
    BitLayout::new(start_bit, length, byte_order, data.len()).map(|layout| layout.extract(data))
}

/// Insert a raw signal value into frame data, leaving other bits untouched.
///
/// Returns `None` (and leaves `data` unmodified) if the signal does not fit.
#[inline]
pub fn insert_raw(
    data: &mut [u8],
    start_bit: u16,
    length: u16,
    byte_order: ByteOrder,
    bits: u64,
) -> Option<()> {
    let layout = BitLayout::new(start_bit, length, byte_order, data.len())?;
    layout.insert(data, bits);
    Some(())
}
