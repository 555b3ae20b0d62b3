//! Key/value dictionary encoding and decoding.
//!
//! App messages carry a flat dictionary of tuples. Keys are numeric ids
//! assigned per application; values are typed payloads.
//!
//! ## Dictionary Format
//!
//! | Field   | Size (bytes) | Description                           |
//! |---------|--------------|---------------------------------------|
//! | count   | 1            | Number of tuples.                     |
//! | tuples  | variable     | `count` tuples, back to back.         |
//!
//! Each tuple:
//!
//! | Field  | Size (bytes) | Description                            |
//! |--------|--------------|----------------------------------------|
//! | key    | 4            | Key id (little-endian).                |
//! | type   | 1            | One of the `TUPLE_TYPE_*` codes.       |
//! | length | 2            | Value length in bytes (little-endian). |
//! | value  | length       | Value payload.                         |

use crate::constants::*;
use crate::error::ProtocolError;

/// A typed tuple value.
#[derive(Debug, Clone, PartialEq)]
pub enum TupleValue {
    /// Raw byte array.
    Bytes(Vec<u8>),
    /// NUL-terminated string (the terminator is not stored here).
    CString(String),
    /// Unsigned 32-bit integer.
    Uint(u32),
    /// Signed 32-bit integer.
    Int(i32),
}

impl TupleValue {
    /// Get the tuple type code for this value.
    pub fn type_code(&self) -> u8 {
        match self {
            TupleValue::Bytes(_) => TUPLE_TYPE_BYTES,
            TupleValue::CString(_) => TUPLE_TYPE_CSTRING,
            TupleValue::Uint(_) => TUPLE_TYPE_UINT,
            TupleValue::Int(_) => TUPLE_TYPE_INT,
        }
    }

    /// Get the value as a signed integer, if it is numeric.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            TupleValue::Int(v) => Some(*v),
            TupleValue::Uint(v) => Some(*v as i32),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TupleValue::CString(s) => Some(s),
            _ => None,
        }
    }
}

/// One key/value pair as it appears on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    /// Numeric key id, meaningful only within the owning app's manifest.
    pub key: u32,
    /// Value payload.
    pub value: TupleValue,
}

impl Tuple {
    /// Create a new tuple.
    pub fn new(key: u32, value: TupleValue) -> Self {
        Tuple { key, value }
    }
}

/// Decode a key/value dictionary from a payload.
pub fn decode_dict(data: &[u8]) -> Result<Vec<Tuple>, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::FrameTooShort {
            expected: 1,
            actual: 0,
        });
    }

    let count = data[0] as usize;
    let mut tuples = Vec::with_capacity(count);
    let mut i = 1;

    for _ in 0..count {
        // key(4) + type(1) + length(2)
        if data.len() < i + 7 {
            return Err(ProtocolError::FrameTooShort {
                expected: i + 7,
                actual: data.len(),
            });
        }
        let key = u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        let type_code = data[i + 4];
        let length = u16::from_le_bytes([data[i + 5], data[i + 6]]) as usize;
        i += 7;

        if data.len() < i + length {
            return Err(ProtocolError::FrameTooShort {
                expected: i + length,
                actual: data.len(),
            });
        }
        let raw = &data[i..i + length];
        i += length;

        let value = match type_code {
            TUPLE_TYPE_BYTES => TupleValue::Bytes(raw.to_vec()),
            TUPLE_TYPE_CSTRING => {
                let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                let s = std::str::from_utf8(&raw[..end])
                    .map_err(|_| ProtocolError::InvalidUtf8)?;
                TupleValue::CString(s.to_string())
            }
            TUPLE_TYPE_UINT => {
                if length != 4 {
                    return Err(ProtocolError::InvalidData(format!(
                        "uint tuple with length {}",
                        length
                    )));
                }
                TupleValue::Uint(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            }
            TUPLE_TYPE_INT => {
                if length != 4 {
                    return Err(ProtocolError::InvalidData(format!(
                        "int tuple with length {}",
                        length
                    )));
                }
                TupleValue::Int(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            }
            other => return Err(ProtocolError::UnknownTupleType(other)),
        };

        tuples.push(Tuple { key, value });
    }

    Ok(tuples)
}

/// Encode a key/value dictionary.
///
/// Fails closed if the encoded payload would exceed [`MAX_DICT_SIZE`] or the
/// tuple count does not fit the count byte; no partial dictionary is
/// produced.
pub fn encode_dict(tuples: &[Tuple]) -> Result<Vec<u8>, ProtocolError> {
    if tuples.len() > u8::MAX as usize {
        return Err(ProtocolError::InvalidData(format!(
            "too many tuples: {}",
            tuples.len()
        )));
    }

    let mut buf = Vec::with_capacity(64);
    buf.push(tuples.len() as u8);

    for tuple in tuples {
        buf.extend_from_slice(&tuple.key.to_le_bytes());
        buf.push(tuple.value.type_code());
        match &tuple.value {
            TupleValue::Bytes(bytes) => {
                buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
                buf.extend_from_slice(bytes);
            }
            TupleValue::CString(s) => {
                // Stored with the trailing NUL.
                buf.extend_from_slice(&((s.len() + 1) as u16).to_le_bytes());
                buf.extend_from_slice(s.as_bytes());
                buf.push(0);
            }
            TupleValue::Uint(v) => {
                buf.extend_from_slice(&4u16.to_le_bytes());
                buf.extend_from_slice(&v.to_le_bytes());
            }
            TupleValue::Int(v) => {
                buf.extend_from_slice(&4u16.to_le_bytes());
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
    }

    if buf.len() > MAX_DICT_SIZE {
        return Err(ProtocolError::FrameTooLong {
            max: MAX_DICT_SIZE,
            actual: buf.len(),
        });
    }

    Ok(buf)
}
