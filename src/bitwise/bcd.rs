// Binary-Coded Decimal decoding

use num_bigint::BigUint;

use crate::fields::{FieldError, FieldResult};

/// Convert a BCD byte to its two decimal digits (tens, ones)
/// Example: 0x12 -> (1, 2), 0x95 -> (9, 5)
pub fn bcd_byte_to_digits(byte: u8) -> FieldResult<(u8, u8)> {
    let tens = (byte & 0xF0) >> 4;
    let ones = byte & 0x0F;

    if tens > 9 || ones > 9 {
        return Err(FieldError::InvalidBcd(byte));
    }

    Ok((tens, ones))
}

/// Convert a BCD array to an integer, most significant byte first
/// Example: [0x12, 0x34, 0x56] -> 123456
pub fn bcd_to_int_be(bcd: &[u8]) -> FieldResult<BigUint> {
    bcd_fold(bcd.iter().copied())
}

/// Convert a BCD array to an integer, least significant byte first
/// Example: [0x56, 0x34, 0x12] -> 123456
pub fn bcd_to_int_le(bcd: &[u8]) -> FieldResult<BigUint> {
    bcd_fold(bcd.iter().rev().copied())
}

fn bcd_fold(bytes: impl Iterator<Item = u8>) -> FieldResult<BigUint> {
    let mut value = BigUint::from(0u8);

    for byte in bytes {
        let (tens, ones) = bcd_byte_to_digits(byte)?;
        value = value * 100u8 + (tens * 10 + ones);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_byte_conversion() {
        assert_eq!(bcd_byte_to_digits(0x12).unwrap(), (1, 2));
        assert_eq!(bcd_byte_to_digits(0x95).unwrap(), (9, 5));
        assert_eq!(bcd_byte_to_digits(0x00).unwrap(), (0, 0));

        assert_eq!(bcd_byte_to_digits(0xAB).unwrap_err(), FieldError::InvalidBcd(0xAB));
    }

    #[test]
    fn test_bcd_to_int_be() {
        assert_eq!(bcd_to_int_be(&[0x12, 0x34, 0x56]).unwrap(), BigUint::from(123456u32));
        // 146.52 MHz stored without trailing zeros
        assert_eq!(bcd_to_int_be(&[0x01, 0x46, 0x52]).unwrap(), BigUint::from(14652u32));
    }

    #[test]
    fn test_bcd_to_int_le() {
        assert_eq!(bcd_to_int_le(&[0x56, 0x34, 0x12]).unwrap(), BigUint::from(123456u32));
    }

    #[test]
    fn test_bcd_past_u128() {
        let nines = [0x99u8; 20];
        let expected = BigUint::from(10u8).pow(40) - 1u8;
        assert_eq!(bcd_to_int_be(&nines).unwrap(), expected);
        assert_eq!(expected.to_string().len(), 40);
    }
}
