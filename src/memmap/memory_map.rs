// Immutable byte buffer that fields are mapped onto

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryMapError {
    #[error("Index out of bounds: {index} (buffer is {len} bytes)")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, MemoryMapError>;

/// Read-only view over a binary dump.
///
/// The buffer is assigned once and never changes afterwards, so every value
/// decoded from it is stable for the lifetime of the map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryMap {
    data: Vec<u8>,
}

impl MemoryMap {
    /// Create a new memory map from bytes
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in bits
    pub fn bit_len(&self) -> usize {
        self.data.len() * 8
    }

    /// Get a chunk of memory from @start for @length bytes
    /// If length is None, returns all data from @start to end
    pub fn get(&self, start: usize, length: Option<usize>) -> Result<&[u8]> {
        let len = self.data.len();
        if start > len {
            return Err(MemoryMapError::IndexOutOfBounds { index: start, len });
        }

        match length {
            Some(count) => {
                let end = start
                    .checked_add(count)
                    .filter(|&end| end <= len)
                    .ok_or(MemoryMapError::IndexOutOfBounds {
                        index: start.saturating_add(count),
                        len,
                    })?;
                Ok(&self.data[start..end])
            }
            None => Ok(&self.data[start..]),
        }
    }

    /// Single byte at @pos
    pub fn byte(&self, pos: usize) -> Result<u8> {
        self.data
            .get(pos)
            .copied()
            .ok_or(MemoryMapError::IndexOutOfBounds {
                index: pos,
                len: self.data.len(),
            })
    }

    /// Printable hex dump of a byte range; both ends are clamped to the buffer
    pub fn printable(&self, start: Option<usize>, end: Option<usize>) -> String {
        let end = end.unwrap_or(self.data.len()).min(self.data.len());
        let start = start.unwrap_or(0).min(end);

        hexdump(&self.data[start..end], start)
    }
}

impl From<Vec<u8>> for MemoryMap {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for MemoryMap {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl AsRef<[u8]> for MemoryMap {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for MemoryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryMap({} bytes)", self.data.len())
    }
}

/// Hex dump in the style of `hexdump -C`, offsets relative to @base
fn hexdump(data: &[u8], base: usize) -> String {
    let mut output = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        output.push_str(&format!("{:08x}  ", base + i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                output.push(' ');
            }
            output.push_str(&format!("{:02x} ", byte));
        }

        // Pad short rows so the ASCII column lines up
        for j in chunk.len()..16 {
            if j == 8 {
                output.push(' ');
            }
            output.push_str("   ");
        }

        output.push_str(" |");
        for &byte in chunk {
            if byte.is_ascii_graphic() || byte == b' ' {
                output.push(byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_map_creation() {
        let mmap = MemoryMap::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(mmap.len(), 5);
        assert_eq!(mmap.bit_len(), 40);
        assert!(!mmap.is_empty());

        assert!(MemoryMap::default().is_empty());
    }

    #[test]
    fn test_get() {
        let mmap = MemoryMap::from(&[0x12u8, 0x34, 0x56][..]);
        assert_eq!(mmap.get(1, Some(2)).unwrap(), &[0x34, 0x56]);
        assert_eq!(mmap.get(2, None).unwrap(), &[0x56]);
        assert_eq!(mmap.get(3, Some(0)).unwrap(), &[] as &[u8]);
        assert_eq!(mmap.byte(0).unwrap(), 0x12);
    }

    #[test]
    fn test_bounds_checking() {
        let mmap = MemoryMap::new(vec![1, 2, 3]);

        assert!(mmap.get(5, Some(1)).is_err());
        assert!(mmap.get(2, Some(5)).is_err());
        assert!(mmap.get(1, Some(usize::MAX)).is_err());
        assert_eq!(
            mmap.byte(3).unwrap_err(),
            MemoryMapError::IndexOutOfBounds { index: 3, len: 3 }
        );
    }

    #[test]
    fn test_hexdump() {
        let data = vec![
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f, 0x41, 0x42, 0x43,
        ];
        let mmap = MemoryMap::new(data);
        let dump = mmap.printable(None, None);
        assert!(dump.starts_with("00000000  00 01 02 03"));
        assert!(dump.contains("00000010  41 42 43"));
        assert!(dump.contains("|ABC|"));

        let tail = mmap.printable(Some(16), Some(100));
        assert!(tail.starts_with("00000010  41 42 43"));
    }
}
