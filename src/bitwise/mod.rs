// Bit-level extraction and typed decoding of binary dumps

pub mod bcd;
pub mod bits;
pub mod decode;
pub mod types;

pub use bcd::{bcd_to_int_be, bcd_to_int_le};
pub use bits::{encode_int, encode_uint, extract_bits, read_bit_at, sign_extend, BitSequence};
pub use decode::{check_layout, decode, read_uint, DecodeOptions};
pub use types::{AsciiMode, DataType, DecodedValue, Endianness};
