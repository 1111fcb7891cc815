// Type definitions shared by extraction and decoding

use lazy_static::lazy_static;
use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::fields::{FieldError, FieldResult};

/// Byte order used when an integer spans more than one packed byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

impl Endianness {
    pub fn is_big(&self) -> bool {
        matches!(self, Endianness::Big)
    }

    pub fn is_little(&self) -> bool {
        matches!(self, Endianness::Little)
    }
}

/// How bytes above 0x7f are treated when decoding ASCII text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AsciiMode {
    /// Pass every byte through as the character with the same code point
    #[default]
    Lenient,
    /// Reject any byte outside 0x00..=0x7f
    Strict,
}

/// Interpretation applied to the bits of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Packed bits, any alignment
    Raw,
    /// Byte-aligned slice, returned unchanged
    Bytes,
    /// Single bit
    Bool,
    /// Any width, true when at least one bit is set
    Flag,
    UInt,
    /// Two's complement over the field width
    Int,
    /// IEEE-754, 32 or 64 bits
    Float,
    Ascii,
    Utf8,
    /// Packed decimal, two digits per byte
    Bcd,
}

impl DataType {
    /// Canonical tag, accepted back by [`DataType::from_tag`]
    pub fn tag(&self) -> &'static str {
        match self {
            DataType::Raw => "raw",
            DataType::Bytes => "bytes",
            DataType::Bool => "bool",
            DataType::Flag => "flag",
            DataType::UInt => "uint",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Ascii => "ascii",
            DataType::Utf8 => "utf8",
            DataType::Bcd => "bcd",
        }
    }

    /// Resolve a type tag to its data type and the length it implies, if any
    ///
    /// `uint16` resolves to `(UInt, Some(16))`, plain `uint` to `(UInt, None)`.
    pub fn from_tag(tag: &str) -> FieldResult<(DataType, Option<usize>)> {
        TYPE_TABLE
            .get(tag)
            .copied()
            .ok_or_else(|| FieldError::UnknownType(tag.to_string()))
    }

    /// Types that can only be read from whole, aligned bytes
    pub fn is_byte_aligned(&self) -> bool {
        matches!(
            self,
            DataType::Bytes | DataType::Ascii | DataType::Utf8 | DataType::Bcd
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

lazy_static! {
    static ref TYPE_TABLE: HashMap<&'static str, (DataType, Option<usize>)> = {
        let mut table = HashMap::new();
        table.insert("raw", (DataType::Raw, None));
        table.insert("bytes", (DataType::Bytes, None));
        table.insert("bool", (DataType::Bool, Some(1)));
        table.insert("bool1", (DataType::Bool, Some(1)));
        table.insert("flag", (DataType::Flag, None));
        table.insert("bool8", (DataType::Flag, Some(8)));
        table.insert("uint", (DataType::UInt, None));
        table.insert("uint8", (DataType::UInt, Some(8)));
        table.insert("uint16", (DataType::UInt, Some(16)));
        table.insert("uint32", (DataType::UInt, Some(32)));
        table.insert("uint64", (DataType::UInt, Some(64)));
        table.insert("int", (DataType::Int, None));
        table.insert("int8", (DataType::Int, Some(8)));
        table.insert("int16", (DataType::Int, Some(16)));
        table.insert("int32", (DataType::Int, Some(32)));
        table.insert("int64", (DataType::Int, Some(64)));
        table.insert("float", (DataType::Float, Some(32)));
        table.insert("double", (DataType::Float, Some(64)));
        table.insert("ascii", (DataType::Ascii, None));
        table.insert("utf8", (DataType::Utf8, None));
        table.insert("bcd", (DataType::Bcd, None));
        table
    };
}

/// Typed interpretation of a field's bits
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Bool(bool),
    /// Unsigned integer of any width
    UInt(BigUint),
    /// Two's complement integer of any width
    Int(BigInt),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl DecodedValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<&BigUint> {
        match self {
            DecodedValue::UInt(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            DecodedValue::Int(value) => Some(value),
            _ => None,
        }
    }

    /// Unsigned value when it fits in a u64
    pub fn as_u64(&self) -> Option<u64> {
        self.as_uint().and_then(|v| u64::try_from(v).ok())
    }

    /// Signed value when it fits in an i64
    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Bool(true) => f.write_str("True"),
            DecodedValue::Bool(false) => f.write_str("False"),
            DecodedValue::UInt(value) => write!(f, "{}", value),
            DecodedValue::Int(value) => write!(f, "{}", value),
            DecodedValue::Float(value) => write!(f, "{}", value),
            DecodedValue::Text(text) => f.write_str(text),
            DecodedValue::Bytes(bytes) => f.write_str(&crate::formats::text::format_raw(bytes)),
        }
    }
}

impl From<&DecodedValue> for serde_json::Value {
    fn from(value: &DecodedValue) -> Self {
        match value {
            DecodedValue::Bool(b) => serde_json::Value::Bool(*b),
            // Wider than JSON numbers reliably carry: fall back to a decimal string
            DecodedValue::UInt(v) => match u64::try_from(v) {
                Ok(small) => serde_json::Value::from(small),
                Err(_) => serde_json::Value::String(v.to_string()),
            },
            DecodedValue::Int(v) => match i64::try_from(v) {
                Ok(small) => serde_json::Value::from(small),
                Err(_) => serde_json::Value::String(v.to_string()),
            },
            // NaN and the infinities have no JSON number form
            DecodedValue::Float(v) => match serde_json::Number::from_f64(*v) {
                Some(number) => serde_json::Value::Number(number),
                None => serde_json::Value::String(v.to_string()),
            },
            DecodedValue::Text(text) => serde_json::Value::String(text.clone()),
            DecodedValue::Bytes(bytes) => serde_json::Value::from(bytes.clone()),
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}
