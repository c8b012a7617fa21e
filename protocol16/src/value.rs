//! The decoded Protocol16 value variant.

/// A decoded Protocol16 value.
///
/// This is a closed variant over the types the wire format can carry.
/// Dictionaries keep insertion order as key/value pairs rather than a map
/// so that float-keyed entries (legal on the wire) remain representable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null, from tag 0 or `*`, or from any failed sub-read.
    Null,
    /// Unsigned byte (`b`).
    U8(u8),
    /// Boolean (`o`); any non-zero wire byte is `true`.
    Bool(bool),
    /// 16-bit signed integer (`k`, or legacy tag 7).
    I16(i16),
    /// 32-bit signed integer (`i`).
    I32(i32),
    /// 64-bit signed integer (`l`).
    I64(i64),
    /// 32-bit float (`f`).
    F32(f32),
    /// 64-bit float (`d`).
    F64(f64),
    /// UTF-8 string (`s`).
    Str(String),
    /// Raw byte run (`x`).
    Bytes(Vec<u8>),
    /// Homogeneous typed array (`y`).
    Array(Vec<Value>),
    /// Array of 32-bit integers (`n`).
    IntArray(Vec<i32>),
    /// Array of strings (`a`).
    StrArray(Vec<String>),
    /// Dictionary (`D` / `h`) as ordered key/value pairs.
    Dict(Vec<(Value, Value)>),
    /// Array of per-element-tagged objects (`z`).
    ObjectArray(Vec<Value>),
}

impl Value {
    /// Widens any integer variant to `i64`.
    ///
    /// Floats truncate toward zero; everything else is `None`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::U8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            Self::F32(v) => Some(*v as i64),
            Self::F64(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Narrowing view as `i32`; wider integers truncate.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::U8(v) => Some(i32::from(*v)),
            Self::I16(v) => Some(i32::from(*v)),
            Self::I32(v) => Some(*v),
            Self::I64(v) => Some(*v as i32),
            _ => None,
        }
    }

    /// Borrowed view as `&str`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// View as `bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Widens any numeric variant to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::U8(v) => Some(f64::from(*v)),
            Self::I16(v) => Some(f64::from(*v)),
            Self::I32(v) => Some(f64::from(*v)),
            Self::I64(v) => Some(*v as f64),
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrowed view as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime type name, as recorded by the discovery catalogue.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::U8(_) => "u8",
            Self::Bool(_) => "bool",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::IntArray(_) => "int_array",
            Self::StrArray(_) => "string_array",
            Self::Dict(_) => "dictionary",
            Self::ObjectArray(_) => "object_array",
        }
    }
}
