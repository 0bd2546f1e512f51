//! Bit-level I/O for Huffman code words.
//!
//! Both directions work MSB-first: the first bit of a code lands in the most
//! significant free bit of the current byte.
//!
//! # Padding Rules
//! - BitWriter: pads the final partial byte with zero bits
//! - BitReader: cannot tell padding from data; the caller stops after the
//!   number of symbols it expects
//!
//! # Example
//! ```
//! use huffzip_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! // 10111 -> padded to 10111000
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b1011_1000]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b11);
//! ```

use crate::codes::Code;
use crate::error::{BitIoError, Result};

/// Packs bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `pending` holds `pending_bits` < 8 bits, right-aligned
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    pending: u64,
    pending_bits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer whose buffer can hold `bits` without reallocating.
    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            ..Self::default()
        }
    }

    /// Append the lowest `count` bits of `value`, most significant first.
    ///
    /// # Errors
    /// `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count as u32;
        while remaining > 0 {
            // Never let the accumulator exceed 64 bits.
            let take = remaining.min(64 - 8 - self.pending_bits).min(32);
            let shift = remaining - take;
            let chunk = (value >> shift) & ((1u64 << take) - 1);

            self.pending = (self.pending << take) | chunk;
            self.pending_bits += take;
            remaining = shift;

            while self.pending_bits >= 8 {
                self.pending_bits -= 8;
                self.bytes.push((self.pending >> self.pending_bits) as u8);
            }
            self.pending &= (1u64 << self.pending_bits) - 1;
        }

        Ok(())
    }

    /// Append one code word.
    pub fn write_code(&mut self, code: Code) -> Result<()> {
        self.write_bits(code.bits(), code.len())
    }

    /// Total number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.pending_bits as usize
    }

    /// Flush the partial byte (zero-padded) and return the buffer.
    pub fn finish(mut self) -> Vec<u8> {
        if self.pending_bits > 0 {
            self.bytes.push((self.pending << (8 - self.pending_bits)) as u8);
        }
        self.bytes
    }
}

/// Reads bits MSB-first from a byte buffer.
///
/// # Invariants
/// - `bit_position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Read one bit.
    ///
    /// # Errors
    /// `BitIoError::UnexpectedEof` once the buffer is exhausted.
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = self
            .data
            .get(self.bit_position / 8)
            .ok_or(BitIoError::UnexpectedEof)?;
        let bit = (byte >> (7 - self.bit_position % 8)) & 1;
        self.bit_position += 1;
        Ok(bit == 1)
    }

    /// Read up to 64 bits into the low bits of the result.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::UnexpectedEof` if fewer than `count` bits remain; the
    ///   position is left unchanged
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }

    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_position
    }

    pub fn position(&self) -> usize {
        self.bit_position
    }

    pub fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_partial_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bits(0b000, 3).unwrap();

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b10111000]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert_eq!(reader.read_bits(3).unwrap(), 0b000);
    }

    #[test]
    fn test_padding() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1).unwrap();
        assert_eq!(writer.bit_len(), 1);
        assert_eq!(writer.finish(), vec![0b10000000]);
    }

    #[test]
    fn test_exact_byte_boundary_has_no_padding_byte() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1111, 4).unwrap();
        writer.write_bits(0b0000, 4).unwrap();
        assert_eq!(writer.finish(), vec![0b11110000]);
    }

    #[test]
    fn test_codes_spanning_bytes() {
        let mut writer = BitWriter::new();
        writer.write_code(Code::new(0b110, 3)).unwrap();
        writer.write_code(Code::new(0b0111111, 7)).unwrap();
        writer.write_code(Code::new(0b1, 1)).unwrap();
        // 110 0111111 1 -> 11001111 11000000
        assert_eq!(writer.finish(), vec![0b11001111, 0b11000000]);
    }

    #[test]
    fn test_64_bit_values() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1).unwrap();
        let val = 0x123456789ABCDEF0u64;
        writer.write_bits(val, 64).unwrap();
        assert_eq!(writer.bit_len(), 65);

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(64).unwrap(), val);
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut writer = BitWriter::new();
        assert!(writer.write_bits(0, 65).is_err());
        let mut reader = BitReader::new(&[0u8; 16]);
        assert!(reader.read_bits(65).is_err());
    }

    #[test]
    fn test_zero_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 0).unwrap();
        assert!(writer.finish().is_empty());

        let mut reader = BitReader::new(&[0xFF]);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0b10101010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(8).unwrap(), 0b10101010);
        assert!(reader.is_empty());
        assert!(matches!(
            reader.read_bit(),
            Err(crate::error::Error::BitIo(BitIoError::UnexpectedEof))
        ));
    }

    #[test]
    fn test_short_read_keeps_position() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        reader.read_bits(5).unwrap();
        assert!(reader.read_bits(4).is_err());
        assert_eq!(reader.bits_remaining(), 3);
    }
}
