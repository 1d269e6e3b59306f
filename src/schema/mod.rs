//! The immutable in-memory form of a DBC file.
//!
//! A [`Schema`] is built once, either by the parser or by a [`SchemaBuilder`],
//! and then only read. It can be shared across threads without locking.

mod message;
mod signal;

pub use message::{Message, NO_NODE};
pub use signal::{Multiplexing, Signal};

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::parsing::DbcParser;
use crate::types::MessageId;
use crate::{Error, Result};

/// Nodes and messages of a CAN network.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SchemaData"))]
pub struct Schema {
    pub(crate) version: Option<String>,
    pub(crate) nodes: BTreeSet<String>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_messages"))]
    pub(crate) messages: BTreeMap<MessageId, Message>,
}

/// Messages are written as a list; JSON object keys cannot hold a [`MessageId`].
#[cfg(feature = "serde")]
fn serialize_messages<S: serde::Serializer>(
    messages: &BTreeMap<MessageId, Message>,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(messages.values())
}

/// Wire form of a [`Schema`]. Loading goes through [`SchemaBuilder::build`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SchemaData {
    version: Option<String>,
    nodes: BTreeSet<String>,
    messages: Vec<Message>,
}

#[cfg(feature = "serde")]
impl TryFrom<SchemaData> for Schema {
    type Error = Error;

    fn try_from(data: SchemaData) -> Result<Self> {
        SchemaBuilder {
            version: data.version,
            nodes: data.nodes,
            messages: data.messages,
        }
        .build()
    }
}

impl Schema {
    /// Parse DBC text with the default [`ParserConfig`](crate::ParserConfig).
    ///
    /// # Example
    ///
    /// ```
    /// use dbc_codec::{MessageId, Schema};
    ///
    /// let schema = Schema::parse(r#"
    /// BU_: ECM
    /// BO_ 256 Engine: 8 ECM
    ///  SG_ RPM : 0|16@1+ (0.25,0) [0|16000] "rpm" Dash
    /// "#)?;
    ///
    /// let engine = schema.message(MessageId::Standard(256)).unwrap();
    /// assert_eq!(engine.signals()[0].name(), "RPM");
    /// # Ok::<(), dbc_codec::Error>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        DbcParser::new().parse(text)
    }

    /// Read and parse a DBC file.
    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Start building a schema programmatically.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Content of the `VERSION` line, if present.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Network nodes declared in `BU_`.
    pub fn nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    /// Messages ordered by id.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    /// Look up a message by the id number written in the DBC file.
    pub fn message_by_dbc_id(&self, raw: u32) -> Option<&Message> {
        MessageId::from_dbc(raw)
            .ok()
            .and_then(|id| self.messages.get(&id))
    }

    pub fn message_by_name(&self, name: &str) -> Option<&Message> {
        self.messages.values().find(|m| m.name == name)
    }

    /// Serialize the schema as pretty-printed JSON.
    #[cfg(feature = "std")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::SerializationError(format!("JSON serialization failed: {e}"))
        })
    }

    /// Load a schema previously written by [`to_json`](Self::to_json).
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::SerializationError(format!("JSON deserialization failed: {e}"))
        })
    }
}

/// Collects nodes and messages, then checks them once in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    version: Option<String>,
    nodes: BTreeSet<String>,
    messages: Vec<Message>,
}

impl SchemaBuilder {
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(String::from(version));
        self
    }

    pub fn node(mut self, name: &str) -> Self {
        self.nodes.insert(String::from(name));
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Finish the schema.
    ///
    /// Fails with [`Error::MalformedSchema`] when two messages share an id,
    /// a message declares the same signal name twice, or a signal does not
    /// fit in its message's DLC.
    pub fn build(self) -> Result<Schema> {
        let mut messages = BTreeMap::new();
        for message in self.messages {
            for signal in &message.signals {
                signal
                    .layout(message.dlc as usize)
                    .map_err(|e| Error::MalformedSchema {
                        line: None,
                        reason: e.to_string(),
                    })?;
            }
            if let Some(name) = message.duplicate_signal() {
                return Err(Error::MalformedSchema {
                    line: None,
                    reason: format!("signal {name:?} declared twice in message {:?}", message.name),
                });
            }
            if messages.contains_key(&message.id) {
                return Err(Error::MalformedSchema {
                    line: None,
                    reason: format!("message id {} declared twice", message.id),
                });
            }
            messages.insert(message.id, message);
        }
        Ok(Schema {
            version: self.version,
            nodes: self.nodes,
            messages,
        })
    }
}
