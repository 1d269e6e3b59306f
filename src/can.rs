//! Integration with the [`embedded-can`](https://crates.io/crates/embedded-can)
//! frame abstraction.
//!
//! Any type implementing [`embedded_can::Frame`] can be decoded against a
//! [`Schema`] or produced from a [`Message`], so the codec works with
//! whatever CAN driver the application uses.
//!
//! # Example
//!
//! ```ignore
//! use dbc_codec::Schema;
//!
//! let schema = Schema::from_file("vehicle.dbc")?;
//!
//! while let Ok(frame) = can.receive() {
//!     let (message, values) = schema.decode_frame(&frame)?;
//!     println!("{}: {:?}", message.name(), values);
//! }
//! ```

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;

use embedded_can::{ExtendedId, Frame, Id, StandardId};

use crate::schema::{Message, Schema};
use crate::types::MessageId;
use crate::{Error, Result};

impl From<Id> for MessageId {
    fn from(id: Id) -> Self {
        match id {
            Id::Standard(id) => MessageId::Standard(id.as_raw()),
            Id::Extended(id) => MessageId::Extended(id.as_raw()),
        }
    }
}

impl TryFrom<MessageId> for Id {
    type Error = Error;

    fn try_from(id: MessageId) -> Result<Self> {
        let converted = match id {
            MessageId::Standard(raw) => StandardId::new(raw).map(Id::Standard),
            MessageId::Extended(raw) => ExtendedId::new(raw).map(Id::Extended),
        };
        converted.ok_or(Error::UnsupportedFrame {
            id: id.to_dbc(),
            len: 0,
        })
    }
}

impl Schema {
    /// Decode a received frame.
    ///
    /// Returns the matching message together with the physical value of
    /// each of its signals. Fails with [`Error::UnknownMessage`] if the
    /// frame's id is not in the schema.
    pub fn decode_frame<F: Frame>(&self, frame: &F) -> Result<(&Message, BTreeMap<String, f64>)> {
        let id = MessageId::from(frame.id());
        let message = self
            .message(id)
            .ok_or(Error::UnknownMessage(id.to_dbc()))?;
        let values = message.decode(frame.data())?;
        Ok((message, values))
    }
}

impl Message {
    /// Encode signal values into a new CAN frame of `dlc` bytes.
    ///
    /// Signals not named in `values` are zero.
    pub fn to_frame<F, I, K, V>(&self, values: I) -> Result<F>
    where
        F: Frame,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<f64>,
    {
        let data = self.encode(values)?;
        let id = Id::try_from(self.id)?;
        F::new(id, &data).ok_or(Error::UnsupportedFrame {
            id: self.id.to_dbc(),
            len: data.len(),
        })
    }
}
