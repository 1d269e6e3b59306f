//! Error types for DBC parsing and signal coding.
//!
//! This module defines the [`Error`] enum which represents every failure the
//! parser and the codec can report. Nothing in this crate retries or prints an
//! error; each one is handed back to the caller.
//!
//! # Example
//!
//! ```
//! use dbc_codec::{Error, Schema};
//!
//! match Schema::parse("VERSION \"\"\n\nBU_: ECM\n") {
//!     Err(Error::MalformedSchema { line, reason }) => {
//!         assert_eq!(line, None);
//!         assert!(reason.contains("BO_"));
//!     }
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

use core::fmt;

use alloc::string::String;

/// Errors that can occur while parsing a DBC schema or coding a frame.
#[derive(Debug)]
pub enum Error {
    /// The DBC text is structurally unusable.
    ///
    /// Parsing aborts on the first such problem and no partial schema is
    /// returned.
    MalformedSchema {
        /// 1-based line of the offending statement, `None` for document-level problems
        line: Option<usize>,
        /// What could not be matched
        reason: String,
    },

    /// An encode request named a signal the message does not define.
    UnknownSignal {
        /// Message the lookup was made against
        message: String,
        /// The signal name that was requested
        signal: String,
    },

    /// A signal's bit range reaches outside the frame.
    BitRangeOverflow {
        /// Signal whose layout overflowed
        signal: String,
        /// Declared start bit
        start_bit: u16,
        /// Declared length in bits
        length: u16,
        /// Number of addressable bits in the frame
        frame_bits: usize,
    },

    /// A signal declares a scale of zero, so physical values cannot be
    /// converted back to raw values.
    DivisionByZeroScale {
        /// The degenerate signal
        signal: String,
    },

    /// The frame is shorter than the message's declared DLC.
    FrameTooShort {
        /// Bytes provided
        actual: usize,
        /// Bytes the message declares
        expected: usize,
    },

    /// No message with this DBC id exists in the schema.
    UnknownMessage(u32),

    /// A CAN frame could not be built for this id and payload, either
    /// because the id is out of range or the frame type rejects the length.
    ///
    /// Only available with the `can` feature.
    #[cfg(feature = "can")]
    UnsupportedFrame {
        /// Message id as written in the DBC file
        id: u32,
        /// Payload length in bytes
        len: usize,
    },

    /// Reading a DBC file failed.
    ///
    /// Only available with the `std` feature.
    #[cfg(feature = "std")]
    IOError(std::io::Error),

    /// JSON export or import of a schema failed.
    ///
    /// Only available with the `std` feature.
    #[cfg(feature = "std")]
    SerializationError(String),
}

impl Error {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedSchema {
            line: Some(line),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedSchema {
                line: Some(line),
                reason,
            } => write!(f, "Malformed schema at line {line}: {reason}"),
            Error::MalformedSchema { line: None, reason } => {
                write!(f, "Malformed schema: {reason}")
            }
            Error::UnknownSignal { message, signal } => {
                write!(f, "Unknown signal {signal:?} in message {message:?}")
            }
            Error::BitRangeOverflow {
                signal,
                start_bit,
                length,
                frame_bits,
            } => write!(
                f,
                "Signal {signal:?} ({start_bit}|{length}) does not fit in a {frame_bits}-bit frame"
            ),
            Error::DivisionByZeroScale { signal } => {
                write!(f, "Signal {signal:?} has a scale of zero")
            }
            Error::FrameTooShort { actual, expected } => write!(
                f,
                "Frame too short: need at least {expected} bytes, got {actual}"
            ),
            Error::UnknownMessage(id) => write!(f, "Unknown message id {id:#x}"),
            #[cfg(feature = "can")]
            Error::UnsupportedFrame { id, len } => {
                write!(f, "Cannot build a CAN frame for id {id:#x} with {len} bytes")
            }
            #[cfg(feature = "std")]
            Error::IOError(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "std")]
            Error::SerializationError(s) => write!(f, "Serialization error: {s}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

/// A specialized Result type for parsing and codec operations.
///
/// This is defined as `core::result::Result<T, Error>` for convenience.
pub type Result<T> = core::result::Result<T, Error>;
