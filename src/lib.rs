// binmap: map named, typed bit-level fields onto raw binary dumps
//
// Bit convention: absolute bit `n` is bit `n % 8` of byte `n / 8`, counted
// from the least-significant bit, and multi-byte integers are little-endian
// unless a field asks for big-endian.

pub mod bitwise;
pub mod fields;
pub mod formats;
pub mod memmap;

// Re-export commonly used types
pub use bitwise::{extract_bits, AsciiMode, BitSequence, DataType, DecodedValue, Endianness};
pub use fields::{
    BitAddress, FieldDescriptor, FieldError, FieldRegistry, FieldResult, FieldSpec,
    RegistryOptions,
};
pub use formats::parse_address;
pub use memmap::MemoryMap;
pub use num_bigint::{BigInt, BigUint};

/// binmap version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldRegistry>();
    }
}
