#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! # dbc-codec
//!
//! A Rust library for packing and unpacking CAN signals described by DBC
//! files.
//!
//! A DBC file describes the messages on a CAN network: each message has an
//! id, a data length (DLC) and a set of signals. Each signal occupies a run of
//! bits in the frame payload and maps its raw integer to a physical value
//! through `physical = raw * scale + offset`.
//!
//! ## Features
//!
//! - **Parsing**: Read DBC text into an immutable [`Schema`]
//! - **Decoding**: Turn frame bytes into named physical values
//! - **Encoding**: Turn physical values into frame bytes, clamping to the
//!   declared range
//! - **Both byte orders**: Intel (little-endian) and Motorola (big-endian)
//!   signals of 1 to 64 bits
//! - **CAN integration**: Decode and build [`embedded_can::Frame`]s (with the
//!   `can` feature)
//!
//! ## Quick Start
//!
//! ```
//! use dbc_codec::{MessageId, Result, Schema};
//!
//! fn main() -> Result<()> {
//!     let schema = Schema::parse(
//!         r#"
//! VERSION "1.0"
//!
//! BU_: ECM Dash
//!
//! BO_ 256 EngineData: 8 ECM
//!  SG_ EngineSpeed : 0|16@1+ (0.25,0) [0|16383.75] "rpm" Dash
//!  SG_ CoolantTemp : 16|8@1+ (1,-40) [-40|215] "degC" Dash
//! "#,
//!     )?;
//!
//!     let id = MessageId::Standard(256);
//!     let frame = schema.encode(id, [("EngineSpeed", 2000.0), ("CoolantTemp", 90.0)])?;
//!     assert_eq!(&frame[..3], &[0x40, 0x1F, 0x82]);
//!
//!     let values = schema.decode(id, &frame)?;
//!     assert_eq!(values["EngineSpeed"], 2000.0);
//!     assert_eq!(values["CoolantTemp"], 90.0);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`parsing`] | DBC text parser with [`DbcParser`] |
//! | [`schema`] | Messages, signals and the [`Schema`] lookup |
//! | [`codec`] | Bit extraction/insertion and the linear conversion |
//! | [`types`] | Byte order, value type, raw values and message ids |
//! | [`can`] | `embedded-can` frame integration |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Cargo Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | yes | File loading, JSON export and `std::error::Error` |
//! | `serde` | with `std` | Serialize/Deserialize for schema types |
//! | `can` | yes | `embedded-can` frame integration |
//!
//! Without `std` the crate is `no_std` and needs only `alloc`.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `core::result::Result<T, Error>`. A parsed [`Schema`] is immutable and can
//! be shared between threads; encoding and decoding never mutate it.

extern crate alloc;

pub mod codec;
pub mod error;
pub mod parsing;
pub mod schema;
pub mod types;

#[cfg(feature = "can")]
pub mod can;

// Re-export commonly used types at the crate root
pub use codec::{DecodedSignal, LinearConversion};
pub use error::{Error, Result};
pub use parsing::{DbcParser, ParserConfig};
pub use schema::{Message, Multiplexing, Schema, SchemaBuilder, Signal};
pub use types::{ByteOrder, MessageId, RawValue, ValueType};
