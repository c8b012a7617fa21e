//! Co-designed Protocol16 encoder.
//!
//! The observer never writes to the network; this module exists so that
//! round-trip tests and the fixture tool can build valid parameter tables.

use std::fmt;

use bytestream::ByteWriter;

use crate::params::Parameters;
use crate::tag;
use crate::value::Value;

/// Result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors that can occur while encoding values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A typed array (`y`) requires every element to share one tag.
    MixedArrayElements {
        /// Tag of the first element.
        expected: u8,
        /// Tag of the offending element.
        found: u8,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MixedArrayElements { expected, found } => {
                write!(
                    f,
                    "typed array elements must share tag {expected}, found {found}"
                )
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Returns the wire tag for a value.
#[must_use]
pub(crate) fn tag_of(value: &Value) -> u8 {
    match value {
        Value::Null => tag::NULL,
        Value::U8(_) => tag::U8,
        Value::Bool(_) => tag::BOOL,
        Value::I16(_) => tag::I16,
        Value::I32(_) => tag::I32,
        Value::I64(_) => tag::I64,
        Value::F32(_) => tag::F32,
        Value::F64(_) => tag::F64,
        Value::Str(_) => tag::STRING,
        Value::Bytes(_) => tag::BYTE_ARRAY,
        Value::Array(_) => tag::ARRAY,
        Value::IntArray(_) => tag::INT_ARRAY,
        Value::StrArray(_) => tag::STRING_ARRAY,
        Value::Dict(_) => tag::DICTIONARY,
        Value::ObjectArray(_) => tag::OBJECT_ARRAY,
    }
}

/// Encodes a value body (the tag itself is written by the caller).
///
/// # Errors
///
/// Returns [`EncodeError::MixedArrayElements`] if a typed array holds
/// elements of different types.
pub fn encode_value(writer: &mut ByteWriter, value: &Value) -> EncodeResult<()> {
    match value {
        Value::Null => {}
        Value::U8(v) => writer.write_u8(*v),
        Value::Bool(v) => writer.write_bool(*v),
        Value::I16(v) => writer.write_i16(*v),
        Value::I32(v) => writer.write_i32(*v),
        Value::I64(v) => writer.write_i64(*v),
        Value::F32(v) => writer.write_f32(*v),
        Value::F64(v) => writer.write_f64(*v),
        Value::Str(v) => writer.write_string(v),
        Value::Bytes(v) => {
            writer.write_u32(v.len() as u32);
            writer.write_bytes(v);
        }
        Value::Array(values) => {
            writer.write_u16(values.len() as u16);
            let element_tag = values.first().map_or(tag::NULL, tag_of);
            writer.write_u8(element_tag);
            for element in values {
                let found = tag_of(element);
                if found != element_tag {
                    return Err(EncodeError::MixedArrayElements {
                        expected: element_tag,
                        found,
                    });
                }
                encode_value(writer, element)?;
            }
        }
        Value::IntArray(values) => {
            writer.write_u32(values.len() as u32);
            for v in values {
                writer.write_i32(*v);
            }
        }
        Value::StrArray(values) => {
            writer.write_u16(values.len() as u16);
            for v in values {
                writer.write_string(v);
            }
        }
        Value::Dict(entries) => encode_dictionary(writer, entries)?,
        Value::ObjectArray(values) => {
            writer.write_u16(values.len() as u16);
            for element in values {
                writer.write_u8(tag_of(element));
                encode_value(writer, element)?;
            }
        }
    }
    Ok(())
}

/// Dictionaries declare one tag per slot position when homogeneous and
/// fall back to inline per-slot tags (declared tag 0) otherwise.
fn encode_dictionary(writer: &mut ByteWriter, entries: &[(Value, Value)]) -> EncodeResult<()> {
    let key_tag = uniform_tag(entries.iter().map(|(k, _)| k));
    let value_tag = uniform_tag(entries.iter().map(|(_, v)| v));
    writer.write_u8(key_tag);
    writer.write_u8(value_tag);
    writer.write_u16(entries.len() as u16);

    for (key, value) in entries {
        if key_tag == tag::UNKNOWN {
            writer.write_u8(tag_of(key));
        }
        encode_value(writer, key)?;
        if value_tag == tag::UNKNOWN {
            writer.write_u8(tag_of(value));
        }
        encode_value(writer, value)?;
    }
    Ok(())
}

fn uniform_tag<'a>(mut values: impl Iterator<Item = &'a Value>) -> u8 {
    let Some(first) = values.next() else {
        return tag::UNKNOWN;
    };
    let first_tag = tag_of(first);
    if values.all(|v| tag_of(v) == first_tag) {
        first_tag
    } else {
        tag::UNKNOWN
    }
}

/// Encodes a full parameter table (count + key/tag/value entries).
///
/// # Errors
///
/// Propagates [`EncodeError`] from value encoding.
pub fn encode_parameters(writer: &mut ByteWriter, params: &Parameters) -> EncodeResult<()> {
    writer.write_u16(params.len() as u16);
    for (key, value) in params {
        writer.write_u8(*key);
        writer.write_u8(tag_of(value));
        encode_value(writer, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_parameters, decode_value};
    use bytestream::ByteReader;

    fn roundtrip(value: &Value) -> Value {
        let mut writer = ByteWriter::new();
        encode_value(&mut writer, value).unwrap();
        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);
        decode_value(&mut reader, tag_of(value))
    }

    #[test]
    fn scalar_roundtrips() {
        for value in [
            Value::Null,
            Value::U8(200),
            Value::Bool(true),
            Value::I16(-300),
            Value::I32(1 << 20),
            Value::I64(-(1 << 40)),
            Value::F32(0.5),
            Value::F64(-2.25),
            Value::Str("hello".into()),
            Value::Bytes(vec![1, 2, 3]),
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn homogeneous_array_roundtrip() {
        let value = Value::Array(vec![Value::I32(1), Value::I32(2), Value::I32(3)]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn mixed_array_rejected() {
        let value = Value::Array(vec![Value::I32(1), Value::U8(2)]);
        let mut writer = ByteWriter::new();
        assert!(matches!(
            encode_value(&mut writer, &value),
            Err(EncodeError::MixedArrayElements { .. })
        ));
    }

    #[test]
    fn mixed_dictionary_uses_inline_tags() {
        let value = Value::Dict(vec![
            (Value::U8(1), Value::Str("a".into())),
            (Value::I32(2), Value::Bool(true)),
        ]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn object_array_roundtrip() {
        let value = Value::ObjectArray(vec![Value::U8(1), Value::Str("x".into()), Value::Null]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn parameters_roundtrip() {
        let params: Parameters = [
            (1, Value::I64(50_000_000_000)),
            (2, Value::Str("Player1".into())),
            (252, Value::I16(82)),
        ]
        .into_iter()
        .collect();

        let mut writer = ByteWriter::new();
        encode_parameters(&mut writer, &params).unwrap();
        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(decode_parameters(&mut reader), params);
    }

    #[test]
    fn error_display() {
        let err = EncodeError::MixedArrayElements {
            expected: 105,
            found: 98,
        };
        let msg = err.to_string();
        assert!(msg.contains("105"));
        assert!(msg.contains("98"));
    }
}
