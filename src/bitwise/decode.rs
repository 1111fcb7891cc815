// Decoding of extracted bit sequences into typed values

use num_bigint::BigUint;

use super::bcd::{bcd_to_int_be, bcd_to_int_le};
use super::bits::{sign_extend, BitSequence};
use super::types::{AsciiMode, DataType, DecodedValue, Endianness};
use crate::fields::{FieldError, FieldResult};

/// Per-field knobs that change how bits are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub endian: Endianness,
    pub ascii_mode: AsciiMode,
}

/// Check that a field of `data_type` can ever decode at this position.
///
/// Run once when a field is declared so that a registered field only fails
/// later on content (non-ASCII bytes, broken UTF-8), never on layout.
pub fn check_layout(
    data_type: DataType,
    start: usize,
    length: usize,
    endian: Endianness,
) -> FieldResult<()> {
    let mismatch = || FieldError::TypeMismatch { data_type, length };

    match data_type {
        DataType::Bool if length != 1 => return Err(mismatch()),
        DataType::Float if length != 32 && length != 64 => return Err(mismatch()),
        _ => {}
    }

    // Big-endian reads reorder whole bytes
    if endian.is_big() && length % 8 != 0 {
        return Err(mismatch());
    }

    if data_type.is_byte_aligned() && (start % 8 != 0 || length % 8 != 0) {
        return Err(FieldError::Alignment {
            data_type,
            start,
            length,
        });
    }

    Ok(())
}

/// Interpret `bits` as `data_type`.
pub fn decode(
    bits: &BitSequence,
    data_type: DataType,
    options: &DecodeOptions,
) -> FieldResult<DecodedValue> {
    let length = bits.len();

    match data_type {
        DataType::Raw => Ok(DecodedValue::Bytes(bits.bytes().to_vec())),
        DataType::Bytes => {
            require_whole_bytes(data_type, length)?;
            Ok(DecodedValue::Bytes(bits.bytes().to_vec()))
        }
        DataType::Bool => {
            if length != 1 {
                return Err(FieldError::TypeMismatch { data_type, length });
            }
            Ok(DecodedValue::Bool(bits.any()))
        }
        DataType::Flag => Ok(DecodedValue::Bool(bits.any())),
        DataType::UInt => Ok(DecodedValue::UInt(read_uint(bits, options.endian))),
        DataType::Int => {
            let value = read_uint(bits, options.endian);
            Ok(DecodedValue::Int(sign_extend(&value, length)))
        }
        DataType::Float => {
            let mut bytes = bits.bytes().to_vec();
            if options.endian.is_big() {
                bytes.reverse();
            }
            match bytes.len() {
                4 if length == 32 => {
                    let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
                    Ok(DecodedValue::Float(f32::from_le_bytes(raw) as f64))
                }
                8 if length == 64 => {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&bytes);
                    Ok(DecodedValue::Float(f64::from_le_bytes(raw)))
                }
                _ => Err(FieldError::TypeMismatch { data_type, length }),
            }
        }
        DataType::Ascii => {
            require_whole_bytes(data_type, length)?;
            decode_ascii(bits.bytes(), options.ascii_mode).map(DecodedValue::Text)
        }
        DataType::Utf8 => {
            require_whole_bytes(data_type, length)?;
            String::from_utf8(bits.bytes().to_vec())
                .map(DecodedValue::Text)
                .map_err(|e| FieldError::InvalidUtf8(e.to_string()))
        }
        DataType::Bcd => {
            require_whole_bytes(data_type, length)?;
            let value = match options.endian {
                Endianness::Big => bcd_to_int_be(bits.bytes())?,
                Endianness::Little => bcd_to_int_le(bits.bytes())?,
            };
            Ok(DecodedValue::UInt(value))
        }
    }
}

/// Unsigned value of the packed bytes, little-endian unless asked otherwise
pub fn read_uint(bits: &BitSequence, endian: Endianness) -> BigUint {
    match endian {
        Endianness::Little => BigUint::from_bytes_le(bits.bytes()),
        Endianness::Big => BigUint::from_bytes_be(bits.bytes()),
    }
}

fn decode_ascii(bytes: &[u8], mode: AsciiMode) -> FieldResult<String> {
    if mode == AsciiMode::Strict {
        if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
            return Err(FieldError::NonAscii {
                offset,
                byte: bytes[offset],
            });
        }
    }

    Ok(bytes.iter().map(|&b| b as char).collect())
}

fn require_whole_bytes(data_type: DataType, length: usize) -> FieldResult<()> {
    if length % 8 != 0 {
        return Err(FieldError::Alignment {
            data_type,
            start: 0,
            length,
        });
    }
    Ok(())
}
