// Errors raised while declaring, extracting and decoding fields

use crate::bitwise::DataType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Invalid field '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("Field '{0}' is already registered")]
    DuplicateName(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown data type: {0}")]
    UnknownType(String),

    #[error("Type mismatch: {data_type} cannot be decoded from {length} bits")]
    TypeMismatch { data_type: DataType, length: usize },

    #[error("{data_type} must be byte-aligned, got start bit {start} with {length} bits")]
    Alignment {
        data_type: DataType,
        start: usize,
        length: usize,
    },

    #[error("Bits {start}+{length} exceed buffer of {available} bits")]
    OutOfRange {
        start: usize,
        length: usize,
        available: usize,
    },

    #[error("Non-ASCII byte {byte:#04x} at offset {offset}")]
    NonAscii { offset: usize, byte: u8 },

    #[error("Invalid BCD byte: {0:#04x}")]
    InvalidBcd(u8),

    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Invalid address '{0}', expected BYTE:BIT+LENGTH")]
    Address(String),
}

impl FieldError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        FieldError::InvalidDescriptor {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type FieldResult<T> = std::result::Result<T, FieldError>;
