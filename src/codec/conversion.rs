//! Linear mapping between raw and physical signal values.
//!
//! `physical = raw * scale + offset`. Encoding clamps to the declared
//! `[min, max]` range when one is set; decoding never clamps.

use crate::types::{RawValue, ValueType, mask};

/// Scale, offset and range of a signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearConversion {
    /// Multiplier applied to the raw value
    pub scale: f64,
    /// Added after scaling
    pub offset: f64,
    /// Lower physical limit
    pub min: f64,
    /// Upper physical limit
    pub max: f64,
}

impl LinearConversion {
    /// Identity conversion without limits.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: 0.0,
        min: 0.0,
        max: 0.0,
    };

    /// Returns true when `[min, max]` describes a usable range.
    ///
    /// `min == max == 0` is the DBC way of writing "no limits".
    #[inline]
    pub fn has_limits(&self) -> bool {
        self.min < self.max
    }

    /// Clamp a physical value into `[min, max]` when limits are declared.
    #[inline]
    pub fn clamp(&self, physical: f64) -> f64 {
        if self.has_limits() {
            physical.max(self.min).min(self.max)
        } else {
            physical
        }
    }

    /// `raw * scale + offset`, never clamped.
    #[inline]
    pub fn raw_to_physical(&self, raw: RawValue) -> f64 {
        raw.as_f64() * self.scale + self.offset
    }

    /// Convert a physical value to the raw value of a `length`-bit signal.
    ///
    /// The value is clamped, divided back, rounded half away from zero and
    /// wrapped to `length` bits. Returns `None` when `scale` is zero.
    pub fn physical_to_raw(
        &self,
        physical: f64,
        length: u16,
        value_type: ValueType,
    ) -> Option<RawValue> {
        if self.scale == 0.0 {
            return None;
        }
        let unscaled = (self.clamp(physical) - self.offset) / self.scale;
        let bits = round_half_away(unscaled) as u64 & mask(length);
        Some(RawValue::from_bits(bits, length, value_type))
    }
}

impl Default for LinearConversion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Round to the nearest integer, ties away from zero.
///
/// Works without `std` float intrinsics: the cast truncates toward zero and
/// saturates, and any value large enough to lose its fraction is already
/// integral.
fn round_half_away(value: f64) -> i128 {
    let truncated = value as i128;
    let fraction = value - truncated as f64;
    if fraction >= 0.5 {
        truncated.saturating_add(1)
    } else if fraction <= -0.5 {
        truncated.saturating_sub(1)
    } else {
        truncated
    }
}
