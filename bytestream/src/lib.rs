//! Low-level byte reading primitives for the photon-lens decoder.
//!
//! This crate provides a bounded [`ByteReader`] for sequential big-endian
//! decoding and a growable [`ByteWriter`] counterpart used by tests and
//! fixture tooling. It is designed for bounded, panic-free operation with
//! explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about Photon
//!   packets or game events.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_u16(0xBEEF);
//! writer.write_string("hi");
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
//! assert_eq!(reader.read_string().unwrap(), "hi");
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;
