//! Line-by-line DBC parser.
//!
//! The parser walks the text once with an explicit state: top level, inside
//! the `NS_` symbol list, or inside a message whose signals are still being
//! collected. A message is finalized as soon as a statement other than a
//! signal declaration appears; blank lines keep it open. Comments and
//! attributes are collected on the way and applied to the finished messages
//! in a second pass.

use alloc::borrow::Cow;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::cursor::{Cursor, quote_count};
use super::statement::{MessageHeader, Statement};
use crate::schema::{Message, Schema};
use crate::types::MessageId;
use crate::{Error, Result};

/// Default attribute name for the message cycle time.
pub const CYCLE_TIME_ATTRIBUTE: &str = "GenMsgCycleTime";

/// Largest payload of a classic CAN frame.
pub const MAX_CLASSIC_DLC: u8 = 8;

/// Largest payload of a CAN FD frame.
pub const MAX_FD_DLC: u8 = 64;

/// Configuration for [`DbcParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Attribute that carries a message's cycle time in milliseconds.
    /// Default: `"GenMsgCycleTime"`
    pub cycle_time_attribute: String,

    /// Fail when the text has no `BU_` section.
    /// Default: false
    pub require_nodes: bool,

    /// Largest accepted message length in bytes.
    /// Default: 8
    pub max_dlc: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            cycle_time_attribute: String::from(CYCLE_TIME_ATTRIBUTE),
            require_nodes: false,
            max_dlc: MAX_CLASSIC_DLC,
        }
    }
}

/// Parses DBC text into a [`Schema`].
///
/// # Example
///
/// ```
/// use dbc_codec::DbcParser;
///
/// let schema = DbcParser::new()
///     .allow_fd()
///     .require_nodes(true)
///     .parse("BU_: GW\nBO_ 1 Bulk: 64 GW\n")?;
///
/// assert_eq!(schema.message_by_name("Bulk").map(|m| m.dlc()), Some(64));
/// # Ok::<(), dbc_codec::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DbcParser {
    config: ParserConfig,
}

impl DbcParser {
    /// Create a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from an existing configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Set the attribute name that carries the cycle time.
    pub fn cycle_time_attribute(mut self, name: &str) -> Self {
        self.config.cycle_time_attribute = String::from(name);
        self
    }

    /// Set whether a missing `BU_` section is an error.
    pub fn require_nodes(mut self, required: bool) -> Self {
        self.config.require_nodes = required;
        self
    }

    /// Set the largest accepted DLC.
    pub fn max_dlc(mut self, max_dlc: u8) -> Self {
        self.config.max_dlc = max_dlc;
        self
    }

    /// Accept CAN FD payloads of up to 64 bytes.
    pub fn allow_fd(self) -> Self {
        self.max_dlc(MAX_FD_DLC)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse DBC text.
    ///
    /// Fails with [`Error::MalformedSchema`] when no message is declared or
    /// a structural line does not match its grammar. No partial schema is
    /// ever returned.
    pub fn parse(&self, text: &str) -> Result<Schema> {
        let mut state = ParseState::new(&self.config);
        for logical in logical_lines(text) {
            let (line_no, line) = logical?;
            state.feed(line_no, &line)?;
        }
        state.finish()
    }
}

enum Section {
    TopLevel,
    NewSymbols,
    Message(PendingMessage),
}

/// A message whose signal block is still open.
struct PendingMessage {
    line: usize,
    message: Message,
}

/// Message-level metadata, applied once all messages exist.
enum Metadata {
    Comment(String),
    CycleTime(u32),
}

struct ParseState<'c> {
    config: &'c ParserConfig,
    section: Section,
    version: Option<String>,
    nodes: Option<BTreeSet<String>>,
    messages: BTreeMap<MessageId, Message>,
    metadata: Vec<(usize, u32, Metadata)>,
}

impl<'c> ParseState<'c> {
    fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            section: Section::TopLevel,
            version: None,
            nodes: None,
            messages: BTreeMap::new(),
            metadata: Vec::new(),
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) -> Result<()> {
        if let Section::NewSymbols = self.section {
            // Symbols are listed one per indented line
            let trimmed = line.trim();
            let is_symbol =
                line.starts_with(char::is_whitespace) && !trimmed.contains(char::is_whitespace);
            if trimmed.is_empty() || is_symbol {
                return Ok(());
            }
            self.section = Section::TopLevel;
        }

        let statement =
            Statement::parse(line).map_err(|reason| Error::malformed(line_no, reason))?;

        if let Statement::Signal(signal) = statement {
            let Section::Message(pending) = &mut self.section else {
                return Err(Error::malformed(
                    line_no,
                    "signal declared outside of a message",
                ));
            };
            validate_signal(&signal).map_err(|reason| Error::malformed(line_no, reason))?;
            signal
                .layout(pending.message.dlc as usize)
                .map_err(|e| Error::malformed(line_no, e.to_string()))?;
            if pending.message.signal(signal.name()).is_some() {
                return Err(Error::malformed(
                    line_no,
                    format!(
                        "signal {:?} declared twice in message {:?}",
                        signal.name(),
                        pending.message.name()
                    ),
                ));
            }
            pending.message.signals.push(signal);
            return Ok(());
        }

        if let Statement::Blank = statement {
            return Ok(());
        }
        self.close_message()?;

        match statement {
            Statement::Blank | Statement::Signal(_) => {}
            Statement::Version(version) => self.version = Some(version.into_owned()),
            Statement::NewSymbols => self.section = Section::NewSymbols,
            Statement::Nodes(names) => {
                self.nodes
                    .get_or_insert_with(BTreeSet::new)
                    .extend(names.into_iter().map(String::from));
            }
            Statement::Message(header) => {
                let message = self.open_message(line_no, header)?;
                self.section = Section::Message(PendingMessage {
                    line: line_no,
                    message,
                });
            }
            Statement::MessageComment { id, text } => {
                self.metadata
                    .push((line_no, id, Metadata::Comment(text.into_owned())));
            }
            Statement::MessageAttribute { name, id, value } => {
                if name != self.config.cycle_time_attribute.as_str() {
                    log::trace!("line {line_no}: ignoring attribute {name:?}");
                } else if let Ok(ms) = value.parse::<u32>() {
                    self.metadata.push((line_no, id, Metadata::CycleTime(ms)));
                } else {
                    log::debug!("line {line_no}: ignoring non-integer cycle time {value:?}");
                }
            }
            Statement::Other(keyword) => {
                log::trace!("line {line_no}: skipping {keyword} statement");
            }
        }
        Ok(())
    }

    fn open_message(&self, line_no: usize, header: MessageHeader<'_>) -> Result<Message> {
        let id = MessageId::from_dbc(header.id).map_err(|_| {
            Error::malformed(line_no, format!("message id {} does not fit in 29 bits", header.id))
        })?;
        if header.dlc > self.config.max_dlc {
            return Err(Error::malformed(
                line_no,
                format!(
                    "message length {} exceeds the maximum of {}",
                    header.dlc, self.config.max_dlc
                ),
            ));
        }
        Ok(Message::new(id, header.name, header.dlc).with_sender(header.sender))
    }

    fn close_message(&mut self) -> Result<()> {
        let Section::Message(pending) = core::mem::replace(&mut self.section, Section::TopLevel)
        else {
            return Ok(());
        };
        let message = pending.message;
        if self.messages.contains_key(&message.id) {
            return Err(Error::malformed(
                pending.line,
                format!("message id {} declared twice", message.id),
            ));
        }
        log::trace!(
            "message {} ({}) closed with {} signals",
            message.name,
            message.id,
            message.signals.len()
        );
        self.messages.insert(message.id, message);
        Ok(())
    }

    fn finish(mut self) -> Result<Schema> {
        self.close_message()?;

        if self.messages.is_empty() {
            return Err(Error::MalformedSchema {
                line: None,
                reason: "no message section (BO_) found".to_string(),
            });
        }
        if self.config.require_nodes && self.nodes.is_none() {
            return Err(Error::MalformedSchema {
                line: None,
                reason: "no node section (BU_) found".to_string(),
            });
        }

        for (line_no, raw_id, metadata) in self.metadata {
            let message = MessageId::from_dbc(raw_id)
                .ok()
                .and_then(|id| self.messages.get_mut(&id));
            let Some(message) = message else {
                log::debug!("line {line_no}: metadata for unknown message id {raw_id} ignored");
                continue;
            };
            match metadata {
                Metadata::Comment(text) => message.comment = Some(text),
                Metadata::CycleTime(ms) => message.cycle_time_ms = Some(ms),
            }
        }

        Ok(Schema {
            version: self.version,
            nodes: self.nodes.unwrap_or_default(),
            messages: self.messages,
        })
    }
}

fn validate_signal(signal: &crate::Signal) -> core::result::Result<(), &'static str> {
    if signal.length == 0 || signal.length > 64 {
        return Err("signal length must be between 1 and 64 bits");
    }
    if signal.scale == 0.0 {
        return Err("signal scale must not be zero");
    }
    if signal.min > signal.max {
        return Err("signal minimum exceeds its maximum");
    }
    Ok(())
}

/// Keywords that begin a new statement and so cannot continue a comment.
const STATEMENT_KEYWORDS: &[&str] = &[
    "VERSION", "NS_", "BS_", "BU_", "BO_", "SG_", "CM_", "BA_DEF_", "BA_DEF_DEF_", "BA_",
    "VAL_TABLE_", "VAL_", "BO_TX_BU_", "SIG_VALTYPE_", "SIG_GROUP_", "EV_",
];

fn starts_statement(line: &str) -> bool {
    Cursor::new(line)
        .ident()
        .is_some_and(|keyword| STATEMENT_KEYWORDS.contains(&keyword))
}

/// Split `text` into statements, numbering them by their first line.
///
/// A `CM_` statement whose quoted text runs over several lines is joined
/// into one logical line. A comment whose string is still open at the end
/// of the text, or when the next statement begins, is malformed.
fn logical_lines(text: &str) -> impl Iterator<Item = Result<(usize, Cow<'_, str>)>> {
    let mut lines = text.lines().enumerate().peekable();
    core::iter::from_fn(move || {
        let (idx, line) = lines.next()?;
        let is_comment = line.trim_start().starts_with("CM_");
        if !is_comment || quote_count(line) % 2 == 0 {
            return Some(Ok((idx + 1, Cow::Borrowed(line))));
        }
        let mut joined = String::from(line);
        loop {
            match lines.peek() {
                Some(&(_, next)) if !starts_statement(next) => {
                    joined.push('\n');
                    joined.push_str(next);
                    lines.next();
                    if quote_count(&joined) % 2 == 0 {
                        return Some(Ok((idx + 1, Cow::Owned(joined))));
                    }
                }
                _ => return Some(Err(Error::malformed(idx + 1, "unterminated comment string"))),
            }
        }
    })
}
