//! Grammar of the individual DBC statements this crate understands.
//!
//! Structural statements (`BU_`, `BO_`, `SG_`) must match their grammar
//! exactly. Metadata statements (`CM_`, `BA_`) that are not about a message
//! are reported as [`Statement::Other`] and never fail.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::cursor::{Cursor, ScanResult};
use crate::schema::{Multiplexing, NO_NODE, Signal};
use crate::types::{ByteOrder, ValueType};

#[derive(Debug, PartialEq)]
pub(crate) enum Statement<'a> {
    Blank,
    Version(Cow<'a, str>),
    NewSymbols,
    Nodes(Vec<&'a str>),
    Message(MessageHeader<'a>),
    Signal(Signal),
    MessageComment { id: u32, text: Cow<'a, str> },
    MessageAttribute { name: Cow<'a, str>, id: u32, value: &'a str },
    Other(&'a str),
}

#[derive(Debug, PartialEq)]
pub(crate) struct MessageHeader<'a> {
    pub id: u32,
    pub name: &'a str,
    pub dlc: u8,
    pub sender: &'a str,
}

impl<'a> Statement<'a> {
    pub(crate) fn parse(line: &'a str) -> ScanResult<Self> {
        let mut cur = Cursor::new(line);
        let keyword = match cur.ident() {
            Some(k) => k,
            None if cur.at_end() => return Ok(Statement::Blank),
            None => return Ok(Statement::Other("")),
        };

        match keyword {
            "VERSION" => Ok(cur
                .quoted()
                .map(Statement::Version)
                .unwrap_or(Statement::Other(keyword))),
            "NS_" => Ok(Statement::NewSymbols),
            "BU_" => parse_nodes(&mut cur),
            "BO_" => parse_message(&mut cur),
            "SG_" => parse_signal(&mut cur),
            "CM_" => Ok(parse_comment(&mut cur).unwrap_or(Statement::Other(keyword))),
            "BA_" => Ok(parse_attribute(&mut cur).unwrap_or(Statement::Other(keyword))),
            other => Ok(Statement::Other(other)),
        }
    }
}

/// `BU_: NODE_A NODE_B`
fn parse_nodes<'a>(cur: &mut Cursor<'a>) -> ScanResult<Statement<'a>> {
    cur.expect(':', "expected ':' after BU_")?;
    let mut nodes = Vec::new();
    while !cur.at_end() {
        nodes.push(cur.ident().ok_or("invalid node name")?);
    }
    Ok(Statement::Nodes(nodes))
}

/// `BO_ 256 EngineData: 8 ECM`
fn parse_message<'a>(cur: &mut Cursor<'a>) -> ScanResult<Statement<'a>> {
    let id = cur.parse(&[], "invalid message id")?;
    let name = cur.ident().ok_or("invalid message name")?;
    cur.expect(':', "expected ':' after message name")?;
    let dlc = cur.parse(&[], "invalid message length")?;
    let sender = cur.ident().ok_or("missing message sender")?;
    if !cur.at_end() {
        return Err("unexpected text after message sender");
    }
    Ok(Statement::Message(MessageHeader {
        id,
        name,
        dlc,
        sender,
    }))
}

/// `SG_ Name [M|mN] : start|len@order sign (scale,offset) [min|max] "unit" rx,rx`
fn parse_signal<'a>(cur: &mut Cursor<'a>) -> ScanResult<Statement<'a>> {
    let name = cur.ident().ok_or("invalid signal name")?;
    let multiplexing = match cur.peek() {
        Some(':') => None,
        _ => Some(parse_multiplexing(cur.ident().ok_or("expected ':' after signal name")?)?),
    };
    cur.expect(':', "expected ':' after signal name")?;

    let start_bit = cur.parse(&['|'], "invalid start bit")?;
    cur.expect('|', "expected '|' after start bit")?;
    let length = cur.parse(&['@'], "invalid signal length")?;
    cur.expect('@', "expected '@' after signal length")?;
    let byte_order = cur
        .peek()
        .and_then(ByteOrder::from_dbc)
        .ok_or("byte order must be 0 or 1")?;
    cur.eat(if byte_order == ByteOrder::BigEndian { '0' } else { '1' });
    let value_type = cur
        .peek()
        .and_then(ValueType::from_dbc)
        .ok_or("sign must be '+' or '-'")?;
    cur.eat(if value_type == ValueType::Signed { '-' } else { '+' });

    cur.expect('(', "expected '(' before scale")?;
    let scale = cur.real(&[','], "invalid scale")?;
    cur.expect(',', "expected ',' after scale")?;
    let offset = cur.real(&[')'], "invalid offset")?;
    cur.expect(')', "expected ')' after offset")?;

    cur.expect('[', "expected '[' before minimum")?;
    let min = cur.real(&['|'], "invalid minimum")?;
    cur.expect('|', "expected '|' after minimum")?;
    let max = cur.real(&[']'], "invalid maximum")?;
    cur.expect(']', "expected ']' after maximum")?;

    let unit = cur.quoted()?;
    let receivers = parse_receivers(cur.rest())?;

    Ok(Statement::Signal(Signal {
        name: name.to_string(),
        start_bit,
        length,
        byte_order,
        value_type,
        scale,
        offset,
        min,
        max,
        unit: unit.into_owned(),
        receivers,
        multiplexing,
    }))
}

fn parse_multiplexing(marker: &str) -> ScanResult<Multiplexing> {
    if marker == "M" {
        return Ok(Multiplexing::Multiplexor);
    }
    // `m3` or, for nested multiplexing, `m3M`
    let digits = marker
        .strip_prefix('m')
        .map(|rest| rest.strip_suffix('M').unwrap_or(rest))
        .ok_or("invalid multiplexer indicator")?;
    digits
        .parse()
        .map(Multiplexing::Multiplexed)
        .map_err(|_| "invalid multiplexer indicator")
}

fn parse_receivers(text: &str) -> ScanResult<Vec<String>> {
    let text = text.trim().trim_end_matches(';');
    let mut receivers = Vec::new();
    for name in text.split(|c: char| c == ',' || c.is_whitespace()) {
        if name.is_empty() || name == NO_NODE {
            continue;
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err("invalid receiver name");
        }
        receivers.push(name.to_string());
    }
    Ok(receivers)
}

/// `CM_ BO_ 256 "text";`
fn parse_comment<'a>(cur: &mut Cursor<'a>) -> Option<Statement<'a>> {
    if !cur.keyword("BO_") {
        return None;
    }
    let id = cur.parse(&['"'], "").ok()?;
    let text = cur.quoted().ok()?;
    Some(Statement::MessageComment { id, text })
}

/// `BA_ "GenMsgCycleTime" BO_ 256 100;`
fn parse_attribute<'a>(cur: &mut Cursor<'a>) -> Option<Statement<'a>> {
    let name = cur.quoted().ok()?;
    if !cur.keyword("BO_") {
        return None;
    }
    let id = cur.parse(&[], "").ok()?;
    let value = cur.token(&[';'])?;
    Some(Statement::MessageAttribute { name, id, value })
}
