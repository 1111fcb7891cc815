// Named, typed view over a bit range of a dump

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{FieldError, FieldResult};
use crate::bitwise::{
    check_layout, decode, extract_bits, AsciiMode, BitSequence, DataType, DecodeOptions,
    DecodedValue, Endianness,
};
use crate::memmap::MemoryMap;

/// Position of a field: absolute start bit plus bit count.
///
/// Displays as `BYTE:BIT+LENGTH` with a four digit, zero padded byte index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitAddress {
    pub start: usize,
    pub length: usize,
}

impl BitAddress {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Build from the split `byte:bit` form
    pub fn from_parts(byte_pos: usize, bit_pos: usize, length: usize) -> FieldResult<Self> {
        if bit_pos > 7 {
            return Err(FieldError::Address(format!(
                "{}:{}+{}",
                byte_pos, bit_pos, length
            )));
        }
        let start = byte_pos
            .checked_mul(8)
            .and_then(|bits| bits.checked_add(bit_pos))
            .ok_or_else(|| FieldError::Address(format!("{}:{}+{}", byte_pos, bit_pos, length)))?;

        Ok(Self { start, length })
    }

    pub fn byte_pos(&self) -> usize {
        self.start / 8
    }

    pub fn bit_pos(&self) -> usize {
        self.start % 8
    }

    /// Last bit belonging to the range (inclusive)
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length.saturating_sub(1))
    }

    /// True when both ranges share at least one bit
    pub fn overlaps(&self, other: &BitAddress) -> bool {
        self.start < other.start.saturating_add(other.length)
            && other.start < self.start.saturating_add(self.length)
    }
}

impl fmt::Display for BitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}:{}+{}", self.byte_pos(), self.bit_pos(), self.length)
    }
}

/// A field declaration. Holds no data of its own; values are read from the
/// buffer passed in on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    data_type: DataType,
    address: BitAddress,
    endian: Endianness,
}

impl FieldDescriptor {
    /// Declare a field of `length` bits starting at absolute bit `start`
    pub fn new(
        data_type: DataType,
        name: impl Into<String>,
        start: usize,
        length: usize,
    ) -> FieldResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(FieldError::invalid(&name, "field name must not be empty"));
        }
        if length == 0 {
            return Err(FieldError::invalid(&name, "bit length must be at least 1"));
        }
        if start.checked_add(length).is_none() {
            return Err(FieldError::invalid(&name, "bit range overflows"));
        }

        check_layout(data_type, start, length, Endianness::default())?;

        Ok(Self {
            name,
            data_type,
            address: BitAddress::new(start, length),
            endian: Endianness::default(),
        })
    }

    /// Switch the byte order integers and floats are read with
    pub fn with_endian(mut self, endian: Endianness) -> FieldResult<Self> {
        check_layout(self.data_type, self.start(), self.length(), endian)?;
        self.endian = endian;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn address(&self) -> BitAddress {
        self.address
    }

    pub fn start(&self) -> usize {
        self.address.start
    }

    pub fn length(&self) -> usize {
        self.address.length
    }

    pub fn end(&self) -> usize {
        self.address.end()
    }

    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// Pull this field's bits out of `buffer`
    pub fn extract(&self, buffer: &MemoryMap) -> FieldResult<BitSequence> {
        extract_bits(buffer.as_ref(), self.start(), self.length())
    }

    /// Packed bytes backing this field
    pub fn raw_value(&self, buffer: &MemoryMap) -> FieldResult<Vec<u8>> {
        self.extract(buffer).map(BitSequence::into_bytes)
    }

    /// Decode the field against `buffer`; recomputed on every call
    pub fn value(&self, buffer: &MemoryMap, ascii_mode: AsciiMode) -> FieldResult<DecodedValue> {
        let bits = self.extract(buffer)?;
        let options = DecodeOptions {
            endian: self.endian,
            ascii_mode,
        };
        decode(&bits, self.data_type, &options)
    }

    /// `BYTE:BIT+LENGTH`, e.g. `0004:0+16`
    pub fn format_address(&self) -> String {
        self.address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> MemoryMap {
        MemoryMap::new(vec![0x12, 0x34, 0x56, 0x78, 0x34, 0x32])
    }

    #[test]
    fn test_descriptor_value() {
        let enabled = FieldDescriptor::new(DataType::Bool, "enabled", 1, 1).unwrap();
        assert_eq!(
            enabled.value(&buffer(), AsciiMode::Lenient).unwrap(),
            DecodedValue::Bool(true)
        );
        assert_eq!(enabled.raw_value(&buffer()).unwrap(), vec![0x01]);

        let answer = FieldDescriptor::new(DataType::Ascii, "answer", 32, 16).unwrap();
        assert_eq!(
            answer.value(&buffer(), AsciiMode::Lenient).unwrap(),
            DecodedValue::Text("42".to_string())
        );
    }

    #[test]
    fn test_value_is_stable() {
        let field = FieldDescriptor::new(DataType::UInt, "word", 4, 12).unwrap();
        let first = field.value(&buffer(), AsciiMode::Lenient).unwrap();
        let second = field.value(&buffer(), AsciiMode::Lenient).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_descriptors() {
        assert!(matches!(
            FieldDescriptor::new(DataType::UInt, "zero", 0, 0),
            Err(FieldError::InvalidDescriptor { .. })
        ));
        assert!(matches!(
            FieldDescriptor::new(DataType::UInt, "", 0, 8),
            Err(FieldError::InvalidDescriptor { .. })
        ));
        assert!(matches!(
            FieldDescriptor::new(DataType::UInt, "huge", usize::MAX, 2),
            Err(FieldError::InvalidDescriptor { .. })
        ));
        assert!(matches!(
            FieldDescriptor::new(DataType::Bool, "wide", 0, 2),
            Err(FieldError::TypeMismatch { .. })
        ));
        assert!(matches!(
            FieldDescriptor::new(DataType::Ascii, "text", 0, 12),
            Err(FieldError::Alignment { .. })
        ));
    }

    #[test]
    fn test_big_endian_field() {
        let field = FieldDescriptor::new(DataType::UInt, "be", 0, 16)
            .unwrap()
            .with_endian(Endianness::Big)
            .unwrap();
        assert_eq!(
            field.value(&buffer(), AsciiMode::Lenient).unwrap(),
            DecodedValue::UInt(0x1234u32.into())
        );

        let odd = FieldDescriptor::new(DataType::UInt, "odd", 0, 12).unwrap();
        assert!(odd.with_endian(Endianness::Big).is_err());
    }

    #[test]
    fn test_format_address() {
        let field = FieldDescriptor::new(DataType::Raw, "blob", 8 * 123 + 5, 7).unwrap();
        assert_eq!(field.format_address(), "0123:5+7");
        assert_eq!(field.end(), 8 * 123 + 11);

        let addr = field.address();
        assert_eq!(addr.byte_pos() * 8 + addr.bit_pos(), field.start());
    }

    #[test]
    fn test_overlaps() {
        let a = BitAddress::new(0, 8);
        assert!(a.overlaps(&BitAddress::new(7, 1)));
        assert!(!a.overlaps(&BitAddress::new(8, 4)));
        assert!(BitAddress::new(4, 2).overlaps(&a));

        let far = BitAddress::new(usize::MAX - 1, 8);
        assert!(far.overlaps(&BitAddress::new(usize::MAX - 4, 4)));
        assert!(!far.overlaps(&a));
        assert!(!a.overlaps(&far));
        assert_eq!(far.end(), usize::MAX);
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(BitAddress::from_parts(4, 0, 16).unwrap(), BitAddress::new(32, 16));
        assert!(BitAddress::from_parts(0, 8, 1).is_err());
    }
}
