//! Moving signal values in and out of frame bytes.
//!
//! - [`bits`]: raw bit extraction and insertion for both byte orders
//! - [`conversion`]: the linear raw/physical mapping
//!
//! The frame-level operations live on [`Signal`](crate::Signal),
//! [`Message`](crate::Message) and [`Schema`](crate::Schema).

pub mod bits;
pub mod conversion;
mod frame;

pub use bits::{BitLayout, BitSpan, extract_raw, insert_raw, msb0_index};
pub use conversion::LinearConversion;
pub use frame::DecodedSignal;
