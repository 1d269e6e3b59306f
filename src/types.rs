//! Shared types used across the library.
//!
//! These types carry no allocation and are used by both the schema and the
//! bit-level codec.

use crate::{Error, Result};

/// Byte order of a CAN signal, as declared by the `@0`/`@1` marker of a DBC
/// signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// Little-endian (Intel), `@1`
    LittleEndian,
    /// Big-endian (Motorola), `@0`
    BigEndian,
}

impl ByteOrder {
    /// Map the DBC byte-order digit to a [`ByteOrder`].
    pub const fn from_dbc(marker: char) -> Option<Self> {
        match marker {
            '0' => Some(ByteOrder::BigEndian),
            '1' => Some(ByteOrder::LittleEndian),
            _ => None,
        }
    }
}

/// Signedness of a signal's raw value, as declared by the `+`/`-` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// Raw bits are an unsigned integer, `+`
    Unsigned,
    /// Raw bits are a two's-complement integer, `-`
    Signed,
}

impl ValueType {
    /// Map the DBC sign marker to a [`ValueType`].
    pub const fn from_dbc(marker: char) -> Option<Self> {
        match marker {
            '+' => Some(ValueType::Unsigned),
            '-' => Some(ValueType::Signed),
            _ => None,
        }
    }
}

/// A raw signal value, before scale and offset are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawValue {
    /// Raw value of an unsigned signal
    Unsigned(u64),
    /// Raw value of a signed signal, already sign-extended
    Signed(i64),
}

impl RawValue {
    /// Numeric value as `f64`.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            RawValue::Unsigned(v) => v as f64,
            RawValue::Signed(v) => v as f64,
        }
    }

    /// Numeric value widened to `i128`, which holds every raw value losslessly.
    #[inline]
    pub fn as_i128(&self) -> i128 {
        match *self {
            RawValue::Unsigned(v) => v as i128,
            RawValue::Signed(v) => v as i128,
        }
    }

    /// The value's bit pattern truncated to `length` bits.
    ///
    /// Signed values are written in two's complement, so `Signed(-1)` with a
    /// length of 4 yields `0b1111`.
    #[inline]
    pub fn to_bits(&self, length: u16) -> u64 {
        let bits = match *self {
            RawValue::Unsigned(v) => v,
            RawValue::Signed(v) => v as u64,
        };
        bits & mask(length)
    }

    /// Interpret the low `length` bits of `bits` according to `value_type`.
    #[inline]
    pub fn from_bits(bits: u64, length: u16, value_type: ValueType) -> Self {
        let bits = bits & mask(length);
        match value_type {
            ValueType::Unsigned => RawValue::Unsigned(bits),
            ValueType::Signed => RawValue::Signed(sign_extend(bits, length)),
        }
    }
}

/// Bit mask covering the low `length` bits.
#[inline]
pub(crate) fn mask(length: u16) -> u64 {
    if length >= 64 {
        u64::MAX
    } else {
        (1u64 << length) - 1
    }
}

/// Sign-extend the low `length` bits of `value` to an `i64`.
#[inline]
pub fn sign_extend(value: u64, length: u16) -> i64 {
    if length == 0 || length >= 64 {
        return value as i64;
    }
    let sign_bit = 1u64 << (length - 1);
    if value & sign_bit != 0 {
        (value | !mask(length)) as i64
    } else {
        value as i64
    }
}

/// Extended-frame flag in a raw DBC message id.
pub const DBC_EXTENDED_FLAG: u32 = 0x8000_0000;

/// Largest 11-bit identifier.
pub const MAX_STANDARD_ID: u16 = 0x7FF;

/// Largest 29-bit identifier.
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// A CAN message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageId {
    /// 11-bit identifier
    Standard(u16),
    /// 29-bit identifier
    Extended(u32),
}

impl MessageId {
    /// Build an id from the number written in a DBC file.
    ///
    /// Bit 31 marks an extended frame. Values above `0x7FF` without the flag
    /// are extended as well.
    pub fn from_dbc(raw: u32) -> Result<Self> {
        if raw & DBC_EXTENDED_FLAG != 0 {
            return Ok(MessageId::Extended(raw & MAX_EXTENDED_ID));
        }
        if raw <= MAX_STANDARD_ID as u32 {
            Ok(MessageId::Standard(raw as u16))
        } else if raw <= MAX_EXTENDED_ID {
            Ok(MessageId::Extended(raw))
        } else {
            Err(Error::MalformedSchema {
                line: None,
                reason: alloc::format!("message id {raw:#x} does not fit in 29 bits"),
            })
        }
    }

    /// The identifier without the extended flag.
    #[inline]
    pub fn raw(&self) -> u32 {
        match *self {
            MessageId::Standard(id) => id as u32,
            MessageId::Extended(id) => id,
        }
    }

    /// The identifier as written in a DBC file (bit 31 set for extended ids).
    #[inline]
    pub fn to_dbc(&self) -> u32 {
        match *self {
            MessageId::Standard(id) => id as u32,
            MessageId::Extended(id) => id | DBC_EXTENDED_FLAG,
        }
    }

    /// Returns true for 29-bit identifiers.
    #[inline]
    pub fn is_extended(&self) -> bool {
        matches!(self, MessageId::Extended(_))
    }
}

impl core::fmt::Display for MessageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MessageId::Standard(id) => write!(f, "{id:#05X}"),
            MessageId::Extended(id) => write!(f, "{id:#010X}"),
        }
    }
}
