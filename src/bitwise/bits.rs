//! Bit extraction from byte buffers.
//!
//! The buffer is read as one continuous bit stream. Absolute bit `n` lives in
//! byte `n / 8` at bit `n % 8`, counting from the least-significant bit of the
//! byte. Extracted bits are packed the same way: stream bit `start + k` lands
//! in bit `k % 8` of output byte `k / 8`.

use num_bigint::{BigInt, BigUint, Sign};

use crate::fields::{FieldError, FieldResult};

/// Bits pulled out of a buffer, packed LSB-first into bytes.
///
/// Unused high bits of the last byte are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSequence {
    bytes: Vec<u8>,
    len: usize,
}

impl BitSequence {
    /// Wrap packed bytes holding `len` bits; excess bytes are dropped and the
    /// tail of the last byte is cleared.
    pub fn from_packed(mut bytes: Vec<u8>, len: usize) -> Self {
        bytes.resize(len.div_ceil(8), 0);

        let rem = len % 8;
        if rem != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << rem) - 1;
            }
        }

        Self { bytes, len }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed bytes; this is the raw value shown next to a field
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Bit `k` of the sequence (0 or 1)
    pub fn bit(&self, k: usize) -> Option<u8> {
        if k >= self.len {
            return None;
        }
        Some((self.bytes[k / 8] >> (k % 8)) & 1)
    }

    /// Iterate bits in stream order
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |k| (self.bytes[k / 8] >> (k % 8)) & 1)
    }

    /// True when at least one bit is set
    pub fn any(&self) -> bool {
        self.bytes.iter().any(|&b| b != 0)
    }
}

/// Reads the bit at absolute position `abs_bit`. Returns 0 or 1.
pub fn read_bit_at(data: &[u8], abs_bit: usize) -> FieldResult<u8> {
    let byte = data
        .get(abs_bit / 8)
        .ok_or(FieldError::OutOfRange {
            start: abs_bit,
            length: 1,
            available: data.len() * 8,
        })?;

    Ok((byte >> (abs_bit % 8)) & 1)
}

/// Extracts `length` bits starting at absolute bit `start`.
pub fn extract_bits(data: &[u8], start: usize, length: usize) -> FieldResult<BitSequence> {
    if length == 0 {
        return Err(FieldError::InvalidDescriptor {
            name: String::new(),
            reason: "bit length must be at least 1".to_string(),
        });
    }

    let available = data.len() * 8;
    if start
        .checked_add(length)
        .map_or(true, |end| end > available)
    {
        return Err(FieldError::OutOfRange {
            start,
            length,
            available,
        });
    }

    let first = start / 8;
    let shift = start % 8;
    let n_bytes = length.div_ceil(8);
    let mut out = Vec::with_capacity(n_bytes);

    // Each output byte is the tail of one input byte joined with the head of
    // the next. Bytes past the end only ever feed bits masked off below.
    for i in 0..n_bytes {
        let lo = data[first + i] >> shift;
        let hi = if shift == 0 {
            0
        } else {
            data.get(first + i + 1).map_or(0, |b| b << (8 - shift))
        };
        out.push(lo | hi);
    }

    Ok(BitSequence::from_packed(out, length))
}

/// Packs the low `length` bits of `value` the way [`extract_bits`] would
/// have produced them.
pub fn encode_uint(value: &BigUint, length: usize) -> BitSequence {
    BitSequence::from_packed(value.to_bytes_le(), length)
}

/// Two's complement counterpart of [`encode_uint`].
pub fn encode_int(value: &BigInt, length: usize) -> BitSequence {
    let mut bytes = value.to_signed_bytes_le();
    let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
    bytes.resize(bytes.len().max(length.div_ceil(8)), fill);
    BitSequence::from_packed(bytes, length)
}

/// Reads the low `bits` of `value` as a two's complement number.
pub fn sign_extend(value: &BigUint, bits: usize) -> BigInt {
    let signed = BigInt::from(value.clone());
    if bits == 0 || !value.bit(bits as u64 - 1) {
        return signed;
    }
    signed - (BigInt::from(1u8) << bits)
}
