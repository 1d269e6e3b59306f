//! DBC text parsing.
//!
//! [`DbcParser`] turns DBC source text into a [`Schema`](crate::Schema).
//! Only the statements that describe the network structure are modelled:
//!
//! | Statement | Meaning |
//! |-----------|---------|
//! | `VERSION` | Version string |
//! | `BU_` | Network nodes |
//! | `BO_` | Message declaration |
//! | `SG_` | Signal of the preceding message |
//! | `CM_ BO_` | Message comment |
//! | `BA_ "<cycle time attribute>" BO_` | Message cycle time |
//!
//! Every other statement is skipped.

mod cursor;
mod parser;
mod statement;

pub use parser::{CYCLE_TIME_ATTRIBUTE, DbcParser, MAX_CLASSIC_DLC, MAX_FD_DLC, ParserConfig};
