//! Packing signals into frames and unpacking them again.
//!
//! All operations are pure functions of the schema, the frame buffer and the
//! values passed in. A caller that shares one buffer between threads must
//! serialize its encodes; the codec takes no locks.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::borrow::Borrow;

use super::bits::BitLayout;
use crate::schema::{Message, Schema, Signal};
use crate::types::{MessageId, RawValue};
use crate::{Error, Result};

/// One decoded signal: raw and physical value side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedSignal<'a> {
    /// Signal name
    pub name: &'a str,
    /// Raw value read from the frame
    pub raw: RawValue,
    /// `raw * scale + offset`, not clamped
    pub value: f64,
    /// Unit string, possibly empty
    pub unit: &'a str,
}

impl Signal {
    /// Bit layout of this signal in a frame of `frame_len` bytes.
    ///
    /// Fails with [`Error::BitRangeOverflow`] if the signal does not fit.
    pub fn layout(&self, frame_len: usize) -> Result<BitLayout> {
        BitLayout::new(self.start_bit, self.length, self.byte_order, frame_len).ok_or_else(|| {
            Error::BitRangeOverflow {
                signal: self.name.clone(),
                start_bit: self.start_bit,
                length: self.length,
                frame_bits: frame_len * 8,
            }
        })
    }

    /// Read the raw value, sign-extended for signed signals.
    pub fn decode_raw(&self, frame: &[u8]) -> Result<RawValue> {
        let bits = self.layout(frame.len())?.extract(frame);
        Ok(RawValue::from_bits(bits, self.length, self.value_type))
    }

    /// Read the physical value. Out-of-range readings are returned as they
    /// are.
    pub fn decode(&self, frame: &[u8]) -> Result<f64> {
        self.decode_raw(frame).map(|raw| self.raw_to_physical(raw))
    }

    /// `raw * scale + offset`.
    #[inline]
    pub fn raw_to_physical(&self, raw: RawValue) -> f64 {
        self.conversion().raw_to_physical(raw)
    }

    /// Clamp, unscale, round and wrap a physical value to this signal's raw
    /// representation.
    ///
    /// Fails with [`Error::DivisionByZeroScale`] if the scale is zero.
    pub fn physical_to_raw(&self, physical: f64) -> Result<RawValue> {
        self.conversion()
            .physical_to_raw(physical, self.length, self.value_type)
            .ok_or_else(|| Error::DivisionByZeroScale {
                signal: self.name.clone(),
            })
    }

    /// Write a raw value into the frame. Bits outside the signal are kept.
    pub fn encode_raw(&self, frame: &mut [u8], raw: RawValue) -> Result<()> {
        let layout = self.layout(frame.len())?;
        layout.insert(frame, raw.to_bits(self.length));
        Ok(())
    }

    /// Write a physical value into the frame. Bits outside the signal are
    /// kept, and nothing is written on failure.
    pub fn encode(&self, frame: &mut [u8], physical: f64) -> Result<()> {
        let layout = self.layout(frame.len())?;
        let raw = self.physical_to_raw(physical)?;
        layout.insert(frame, raw.to_bits(self.length));
        Ok(())
    }
}

impl Message {
    fn payload_len(&self) -> usize {
        self.dlc as usize
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual < self.payload_len() {
            return Err(Error::FrameTooShort {
                actual,
                expected: self.payload_len(),
            });
        }
        Ok(())
    }

    /// Encode signal values into a new zero-filled frame of `dlc` bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use dbc_codec::{Message, MessageId, Signal};
    ///
    /// let msg = Message::new(MessageId::Standard(0x100), "Engine", 2)
    ///     .with_signal(Signal::new("RPM", 0, 16).with_scale(0.25));
    ///
    /// let frame = msg.encode([("RPM", 2000.0)])?;
    /// assert_eq!(frame, [0x40, 0x1F]);
    /// # Ok::<(), dbc_codec::Error>(())
    /// ```
    pub fn encode<I, K, V>(&self, values: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<f64>,
    {
        let mut frame = vec![0u8; self.payload_len()];
        self.encode_into(&mut frame, values)?;
        Ok(frame)
    }

    /// Encode signal values into an existing frame, keeping the bits of
    /// every signal not named in `values`.
    ///
    /// Every pair is applied on its own: a pair that fails (unknown name,
    /// zero scale, bit range overflow) leaves the frame untouched and does
    /// not stop the remaining pairs. The first failure is returned once all
    /// pairs have been processed.
    ///
    /// Fails with [`Error::FrameTooShort`] before writing anything if `frame`
    /// is shorter than the message's DLC.
    pub fn encode_into<I, K, V>(&self, frame: &mut [u8], values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<f64>,
    {
        self.check_len(frame.len())?;
        let frame = &mut frame[..self.payload_len()];

        let mut first_error = None;
        for (name, value) in values {
            let name = name.as_ref();
            let result = match self.signal(name) {
                Some(signal) => signal.encode(frame, *value.borrow()),
                None => Err(Error::UnknownSignal {
                    message: self.name.clone(),
                    signal: name.to_string(),
                }),
            };
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Decode every signal of the message into its physical value.
    ///
    /// Overlapping signals are each decoded independently.
    pub fn decode(&self, frame: &[u8]) -> Result<BTreeMap<String, f64>> {
        self.decode_signals(frame)?
            .map(|decoded| decoded.map(|d| (d.name.to_string(), d.value)))
            .collect()
    }

    /// Decode every signal with its raw value and unit, in declaration order.
    pub fn decode_detailed(&self, frame: &[u8]) -> Result<Vec<DecodedSignal<'_>>> {
        self.decode_signals(frame)?.collect()
    }

    fn decode_signals<'a, 'f>(
        &'a self,
        frame: &'f [u8],
    ) -> Result<impl Iterator<Item = Result<DecodedSignal<'a>>> + use<'a, 'f>> {
        self.check_len(frame.len())?;
        let frame = &frame[..self.payload_len()];
        Ok(self.signals.iter().map(move |signal| {
            let raw = signal.decode_raw(frame)?;
            Ok(DecodedSignal {
                name: &signal.name,
                raw,
                value: signal.raw_to_physical(raw),
                unit: &signal.unit,
            })
        }))
    }
}

impl Schema {
    fn require(&self, id: MessageId) -> Result<&Message> {
        self.message(id).ok_or(Error::UnknownMessage(id.to_dbc()))
    }

    /// Encode values for the message with the given id.
    pub fn encode<I, K, V>(&self, id: MessageId, values: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<f64>,
    {
        self.require(id)?.encode(values)
    }

    /// Decode a frame of the message with the given id.
    pub fn decode(&self, id: MessageId, frame: &[u8]) -> Result<BTreeMap<String, f64>> {
        self.require(id)?.decode(frame)
    }
}
