//! Protocol16 type tags.
//!
//! Tags are single-byte ASCII codes defined by the Photon protocol. Tag 0
//! appears in the wild as an implicit null; tag 7 is a legacy alias for
//! [`I16`].

/// Unknown / implicit null.
pub const UNKNOWN: u8 = 0;
/// Explicit null value (`*`).
pub const NULL: u8 = b'*';
/// Typed dictionary (`D`).
pub const DICTIONARY: u8 = b'D';
/// Array of strings (`a`).
pub const STRING_ARRAY: u8 = b'a';
/// Unsigned byte (`b`).
pub const U8: u8 = b'b';
/// 64-bit float (`d`).
pub const F64: u8 = b'd';
/// Event data marker (`e`); never carried inside parameter tables.
pub const EVENT_DATA: u8 = b'e';
/// 32-bit float (`f`).
pub const F32: u8 = b'f';
/// Hashtable (`h`); same wire shape as [`DICTIONARY`].
pub const HASHTABLE: u8 = b'h';
/// 32-bit signed integer (`i`).
pub const I32: u8 = b'i';
/// 16-bit signed integer (`k`).
pub const I16: u8 = b'k';
/// Legacy alias for [`I16`] seen in some message versions.
pub const I16_ALT: u8 = 7;
/// 64-bit signed integer (`l`).
pub const I64: u8 = b'l';
/// Array of 32-bit signed integers (`n`).
pub const INT_ARRAY: u8 = b'n';
/// Boolean (`o`).
pub const BOOL: u8 = b'o';
/// Operation response marker (`p`); never carried inside parameter tables.
pub const OPERATION_RESPONSE: u8 = b'p';
/// Operation request marker (`q`); never carried inside parameter tables.
pub const OPERATION_REQUEST: u8 = b'q';
/// Length-prefixed UTF-8 string (`s`).
pub const STRING: u8 = b's';
/// Length-prefixed byte run (`x`).
pub const BYTE_ARRAY: u8 = b'x';
/// Homogeneous typed array (`y`).
pub const ARRAY: u8 = b'y';
/// Array of per-element-tagged objects (`z`).
pub const OBJECT_ARRAY: u8 = b'z';
