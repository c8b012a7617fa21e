//! Protocol16 typed-value decoding for Photon messages.
//!
//! Photon requests, responses, and events carry a parameter table: a
//! mapping from a single-byte key to a value prefixed by a one-byte type
//! tag. This crate decodes those tables into a closed [`Value`] variant
//! and provides the co-designed encoder used by round-trip tests and
//! fixture tooling.
//!
//! # Design Principles
//!
//! - **Never fail loudly** - Malformed input decodes to [`Value::Null`] or
//!   a truncated container; no error escapes the decoder.
//! - **Closed type set** - Consumers branch on the variant, never on
//!   runtime type identity.
//! - **Bounded decoding** - All reads go through the bounds-checked
//!   [`bytestream::ByteReader`].

mod decode;
mod encode;
mod params;
pub mod tag;
mod value;

pub use decode::{decode_parameters, decode_value};
pub use encode::{encode_parameters, encode_value, EncodeError, EncodeResult};
pub use params::Parameters;
pub use value::Value;
