use alloc::string::String;
use alloc::vec::Vec;

use crate::codec::conversion::LinearConversion;
use crate::types::{ByteOrder, ValueType};

/// Multiplexing role of a signal, from the `M` / `mN` marker of its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Multiplexing {
    /// The signal selects which multiplexed signals are valid (`M`)
    Multiplexor,
    /// The signal is valid when the multiplexor equals this value (`mN`)
    Multiplexed(u64),
}

/// A named bit field within a CAN message.
///
/// Signals are created by the parser (or programmatically through the
/// builder methods below) and never change afterwards.
///
/// # Example
///
/// ```
/// use dbc_codec::{ByteOrder, Signal};
///
/// let sig = Signal::new("CoolantTemp", 8, 8)
///     .with_offset(-40.0)
///     .with_limits(-40.0, 215.0)
///     .with_unit("degC");
///
/// assert_eq!(sig.byte_order(), ByteOrder::LittleEndian);
/// assert_eq!(sig.offset(), -40.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub(crate) name: String,
    pub(crate) start_bit: u16,
    pub(crate) length: u16,
    pub(crate) byte_order: ByteOrder,
    pub(crate) value_type: ValueType,
    pub(crate) scale: f64,
    pub(crate) offset: f64,
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) unit: String,
    pub(crate) receivers: Vec<String>,
    pub(crate) multiplexing: Option<Multiplexing>,
}

impl Signal {
    /// Create an unsigned little-endian signal with scale 1, offset 0 and no
    /// limits.
    pub fn new(name: &str, start_bit: u16, length: u16) -> Self {
        Self {
            name: String::from(name),
            start_bit,
            length,
            byte_order: ByteOrder::LittleEndian,
            value_type: ValueType::Unsigned,
            scale: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 0.0,
            unit: String::new(),
            receivers: Vec::new(),
            multiplexing: None,
        }
    }

    /// Set the scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the offset.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the physical range used to clamp encoded values.
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Mark the signal as signed (two's complement).
    pub fn signed(mut self) -> Self {
        self.value_type = ValueType::Signed;
        self
    }

    /// Set the byte order to big-endian (Motorola).
    pub fn big_endian(mut self) -> Self {
        self.byte_order = ByteOrder::BigEndian;
        self
    }

    /// Set the unit string.
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = String::from(unit);
        self
    }

    /// Set the receiving nodes.
    pub fn with_receivers<I, S>(mut self, receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.receivers = receivers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the multiplexing role.
    pub fn with_multiplexing(mut self, multiplexing: Multiplexing) -> Self {
        self.multiplexing = Some(multiplexing);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start bit as declared: the LSB for little-endian signals, the MSB for
    /// big-endian ones.
    pub fn start_bit(&self) -> u16 {
        self.start_bit
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_signed(&self) -> bool {
        self.value_type == ValueType::Signed
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Unit string, empty when the DBC declares none.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Receiving nodes. Empty means broadcast.
    pub fn receivers(&self) -> &[String] {
        &self.receivers
    }

    pub fn multiplexing(&self) -> Option<Multiplexing> {
        self.multiplexing
    }

    /// The signal's raw/physical conversion.
    pub fn conversion(&self) -> LinearConversion {
        LinearConversion {
            scale: self.scale,
            offset: self.offset,
            min: self.min,
            max: self.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_builder() {
        let sig = Signal::new("TestSignal", 0, 16)
            .with_scale(0.1)
            .with_offset(-40.0)
            .signed()
            .big_endian()
            .with_unit("km/h")
            .with_receivers(["ABS", "TCU"]);

        assert_eq!(sig.name(), "TestSignal");
        assert_eq!(sig.start_bit(), 0);
        assert_eq!(sig.length(), 16);
        assert!((sig.scale() - 0.1).abs() < 0.0001);
        assert!((sig.offset() - (-40.0)).abs() < 0.0001);
        assert!(sig.is_signed());
        assert_eq!(sig.byte_order(), ByteOrder::BigEndian);
        assert_eq!(sig.unit(), "km/h");
        assert_eq!(sig.receivers(), ["ABS", "TCU"]);
        assert_eq!(sig.multiplexing(), None);
    }

    #[test]
    fn test_conversion_mirrors_fields() {
        let sig = Signal::new("Temp", 0, 8)
            .with_offset(-40.0)
            .with_limits(-40.0, 215.0);
        let conv = sig.conversion();
        assert_eq!(conv.scale, 1.0);
        assert_eq!(conv.offset, -40.0);
        assert!(conv.has_limits());
    }
}
