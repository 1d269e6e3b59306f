use alloc::string::String;
use alloc::vec::Vec;

use super::Signal;
use crate::types::MessageId;

/// Placeholder node name DBC files use for "no node".
pub const NO_NODE: &str = "Vector__XXX";

/// A CAN message definition: its id, payload length and signals.
///
/// # Example
///
/// ```
/// use dbc_codec::{Message, MessageId, Signal};
///
/// let msg = Message::new(MessageId::Standard(0x100), "EngineData", 8)
///     .with_sender("ECM")
///     .with_signal(Signal::new("RPM", 0, 16).with_scale(0.25))
///     .with_cycle_time(10);
///
/// assert_eq!(msg.signal("RPM").map(|s| s.scale()), Some(0.25));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub(crate) id: MessageId,
    pub(crate) name: String,
    pub(crate) dlc: u8,
    pub(crate) sender: String,
    pub(crate) signals: Vec<Signal>,
    pub(crate) cycle_time_ms: Option<u32>,
    pub(crate) comment: Option<String>,
}

impl Message {
    /// Create a message without signals, sent by no particular node.
    pub fn new(id: MessageId, name: &str, dlc: u8) -> Self {
        Self {
            id,
            name: String::from(name),
            dlc,
            sender: String::from(NO_NODE),
            signals: Vec::new(),
            cycle_time_ms: None,
            comment: None,
        }
    }

    /// Set the transmitting node.
    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = String::from(sender);
        self
    }

    /// Append a signal.
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// Set the cycle time in milliseconds.
    pub fn with_cycle_time(mut self, cycle_time_ms: u32) -> Self {
        self.cycle_time_ms = Some(cycle_time_ms);
        self
    }

    /// Set the message comment.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(String::from(comment));
        self
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload length in bytes.
    pub fn dlc(&self) -> u8 {
        self.dlc
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Signals in declaration order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Look up a signal by name.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    pub fn cycle_time_ms(&self) -> Option<u32> {
        self.cycle_time_ms
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Name of the first signal that appears twice, if any.
    pub(crate) fn duplicate_signal(&self) -> Option<&str> {
        self.signals
            .iter()
            .enumerate()
            .find(|(i, s)| self.signals[..*i].iter().any(|p| p.name == s.name))
            .map(|(_, s)| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let msg = Message::new(MessageId::Extended(0x18FF_50E5), "Status", 4)
            .with_sender("BMS")
            .with_signal(Signal::new("SoC", 0, 8))
            .with_signal(Signal::new("Fault", 8, 1))
            .with_comment("Battery status");

        assert_eq!(msg.id().raw(), 0x18FF_50E5);
        assert_eq!(msg.name(), "Status");
        assert_eq!(msg.dlc(), 4);
        assert_eq!(msg.sender(), "BMS");
        assert_eq!(msg.signals().len(), 2);
        assert_eq!(msg.comment(), Some("Battery status"));
        assert_eq!(msg.cycle_time_ms(), None);
        assert!(msg.signal("Fault").is_some());
        assert!(msg.signal("Missing").is_none());
    }

    #[test]
    fn test_default_sender() {
        let msg = Message::new(MessageId::Standard(1), "M", 8);
        assert_eq!(msg.sender(), NO_NODE);
    }

    #[test]
    fn test_duplicate_signal() {
        let msg = Message::new(MessageId::Standard(1), "M", 8)
            .with_signal(Signal::new("A", 0, 8))
            .with_signal(Signal::new("B", 8, 8))
            .with_signal(Signal::new("A", 16, 8));
        assert_eq!(msg.duplicate_signal(), Some("A"));
    }
}
