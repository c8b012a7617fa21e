//! Tag-driven value and parameter-table decoding.

use bytestream::ByteReader;

use crate::params::Parameters;
use crate::tag;
use crate::value::Value;

/// Decodes a single typed value for the given type tag.
///
/// This never fails: any sub-read that underflows yields [`Value::Null`]
/// (or a truncated container), and an unknown tag yields [`Value::Null`]
/// without consuming bytes. Further progress after an unknown tag is
/// best-effort; the enclosing table iteration will terminate on underflow.
#[must_use]
pub fn decode_value(reader: &mut ByteReader<'_>, value_tag: u8) -> Value {
    match value_tag {
        tag::UNKNOWN | tag::NULL => Value::Null,

        tag::U8 => reader.read_u8().map_or(Value::Null, Value::U8),

        tag::BOOL => reader.read_bool().map_or(Value::Null, Value::Bool),

        tag::I16 | tag::I16_ALT => reader.read_i16().map_or(Value::Null, Value::I16),

        tag::I32 => reader.read_i32().map_or(Value::Null, Value::I32),

        tag::I64 => reader.read_i64().map_or(Value::Null, Value::I64),

        tag::F32 => reader.read_f32().map_or(Value::Null, Value::F32),

        tag::F64 => reader.read_f64().map_or(Value::Null, Value::F64),

        // A truncated string decodes to the empty string, not null.
        tag::STRING => reader
            .read_string()
            .map_or(Value::Str(String::new()), Value::Str),

        tag::BYTE_ARRAY => {
            let Ok(length) = reader.read_u32() else {
                return Value::Null;
            };
            reader
                .read_bytes(length as usize)
                .map_or(Value::Null, Value::Bytes)
        }

        tag::ARRAY => {
            let Ok(length) = reader.read_u16() else {
                return Value::Null;
            };
            let Ok(element_tag) = reader.read_u8() else {
                return Value::Null;
            };
            let mut values = Vec::new();
            for _ in 0..length {
                if reader.is_empty() {
                    break;
                }
                values.push(decode_value(reader, element_tag));
            }
            Value::Array(values)
        }

        tag::INT_ARRAY => {
            let Ok(length) = reader.read_u32() else {
                return Value::Null;
            };
            let mut values = Vec::new();
            for _ in 0..length {
                let Ok(value) = reader.read_i32() else {
                    break;
                };
                values.push(value);
            }
            Value::IntArray(values)
        }

        tag::STRING_ARRAY => {
            let Ok(length) = reader.read_u16() else {
                return Value::Null;
            };
            let mut values = Vec::new();
            for _ in 0..length {
                if reader.is_empty() {
                    break;
                }
                match decode_value(reader, tag::STRING) {
                    Value::Str(s) => values.push(s),
                    _ => break,
                }
            }
            Value::StrArray(values)
        }

        tag::DICTIONARY | tag::HASHTABLE => decode_dictionary(reader),

        tag::OBJECT_ARRAY => {
            let Ok(length) = reader.read_u16() else {
                return Value::Null;
            };
            let mut values = Vec::new();
            for _ in 0..length {
                if reader.is_empty() {
                    break;
                }
                let Ok(element_tag) = reader.read_u8() else {
                    break;
                };
                values.push(decode_value(reader, element_tag));
            }
            Value::ObjectArray(values)
        }

        _ => Value::Null,
    }
}

/// Dictionary layout: key tag, value tag, u16 entry count, entries.
///
/// A declared tag of 0 means every slot in that position carries its own
/// inline tag instead.
fn decode_dictionary(reader: &mut ByteReader<'_>) -> Value {
    let Ok(key_tag) = reader.read_u8() else {
        return Value::Null;
    };
    let Ok(value_tag) = reader.read_u8() else {
        return Value::Null;
    };
    let Ok(length) = reader.read_u16() else {
        return Value::Null;
    };

    let mut entries = Vec::new();
    for _ in 0..length {
        if reader.is_empty() {
            break;
        }

        let key = if key_tag == tag::UNKNOWN {
            let Ok(inline_tag) = reader.read_u8() else {
                break;
            };
            decode_value(reader, inline_tag)
        } else {
            decode_value(reader, key_tag)
        };

        let value = if value_tag == tag::UNKNOWN {
            let Ok(inline_tag) = reader.read_u8() else {
                break;
            };
            decode_value(reader, inline_tag)
        } else {
            decode_value(reader, value_tag)
        };

        entries.push((key, value));
    }
    Value::Dict(entries)
}

/// Decodes a Protocol16 parameter table.
///
/// Layout: u16 parameter count, then `count` entries of
/// (key byte, tag byte, value). Iteration stops early when the buffer is
/// exhausted; the result is a truncated but well-typed table. Duplicate
/// keys keep the last value.
#[must_use]
pub fn decode_parameters(reader: &mut ByteReader<'_>) -> Parameters {
    let mut params = Parameters::new();

    if reader.remaining() < 2 {
        return params;
    }
    let Ok(count) = reader.read_u16() else {
        return params;
    };

    for _ in 0..count {
        if reader.is_empty() {
            break;
        }
        let Ok(key) = reader.read_u8() else {
            break;
        };
        let Ok(value_tag) = reader.read_u8() else {
            break;
        };
        params.insert(key, decode_value(reader, value_tag));
    }

    params
}
