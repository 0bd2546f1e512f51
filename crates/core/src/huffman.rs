//! Huffman codebook: the tree and code table of one chunk, and the
//! bitstream packer/unpacker built on them.
//!
//! A [`Codebook`] is rebuilt from the frequency table on both sides of the
//! wire, so nothing but the counts has to be stored.

use crate::bitio::{BitReader, BitWriter};
use crate::codes::CodeTable;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanNode, HuffmanTree};

/// Tree and code table for one chunk.
#[derive(Debug, Clone)]
pub struct Codebook {
    tree: HuffmanTree,
    codes: CodeTable,
}

impl Codebook {
    /// Build the tree and codes for a non-empty frequency table.
    ///
    /// # Errors
    /// - `HuffmanError::EmptyFrequencyTable` for an empty table
    /// - `HuffmanError::CodeLengthTooLong` for pathological counts
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::build(freqs)?;
        let codes = CodeTable::from_tree(&tree)?;
        Ok(Self { tree, codes })
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// Number of payload bits needed to encode a buffer with these counts.
    pub fn encoded_bits(&self, freqs: &FrequencyTable) -> u64 {
        freqs
            .iter()
            .map(|(byte, count)| {
                let len = self.codes.get(byte).map_or(0, |code| code.len() as u64);
                count * len
            })
            .sum()
    }

    /// Pack the code of every byte of `data`, in order, MSB-first.
    ///
    /// The final byte is zero-padded; the padding length is not recorded.
    ///
    /// # Errors
    /// `HuffmanError::MissingSymbol` if `data` holds a byte with no code.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity_bits(data.len());
        for &byte in data {
            let code = self
                .codes
                .get(byte)
                .ok_or(HuffmanError::MissingSymbol { byte })?;
            writer.write_code(code)?;
        }
        Ok(writer.finish())
    }

    /// Walk the tree bit by bit, emitting a byte at every leaf, until exactly
    /// `expected_len` bytes have been produced. Bits after that (padding) are
    /// never looked at.
    ///
    /// # Errors
    /// - `BitIoError::UnexpectedEof` if the payload runs out first
    /// - `HuffmanError::InvalidCode` if a lone-leaf tree meets a `1` bit
    pub fn decode(&self, payload: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let mut reader = BitReader::new(payload);
        let mut output = Vec::with_capacity(expected_len);

        match self.tree.root() {
            HuffmanNode::Leaf { byte, .. } => {
                // One symbol, one bit per occurrence, always `0`.
                while output.len() < expected_len {
                    let position = reader.position();
                    if reader.read_bit()? {
                        return Err(HuffmanError::InvalidCode { position }.into());
                    }
                    output.push(*byte);
                }
            }
            root => {
                while output.len() < expected_len {
                    let mut node = root;
                    while let HuffmanNode::Internal { left, right, .. } = node {
                        node = if reader.read_bit()? { right.as_ref() } else { left.as_ref() };
                    }
                    if let HuffmanNode::Leaf { byte, .. } = node {
                        output.push(*byte);
                    }
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BitIoError, Error};

    fn codebook_for(data: &[u8]) -> Codebook {
        Codebook::from_frequencies(&FrequencyTable::from_bytes(data)).unwrap()
    }

    #[test]
    fn test_encode_decode() {
        let data = b"hello world! this is a test.";
        let codebook = codebook_for(data);
        let packed = codebook.encode(data).unwrap();
        assert_eq!(codebook.decode(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_single_symbol_packs_one_bit_each() {
        let data = vec![b'X'; 20];
        let codebook = codebook_for(&data);
        let packed = codebook.encode(&data).unwrap();
        assert_eq!(packed, vec![0, 0, 0]);
        assert_eq!(codebook.decode(&packed, 20).unwrap(), data);
    }

    #[test]
    fn test_encoded_bits_matches_packer() {
        let data = b"abracadabra alakazam";
        let freqs = FrequencyTable::from_bytes(data);
        let codebook = Codebook::from_frequencies(&freqs).unwrap();
        let bits = codebook.encoded_bits(&freqs);
        let packed = codebook.encode(data).unwrap();
        assert_eq!(packed.len() as u64, bits.div_ceil(8));
    }

    #[test]
    fn test_padding_not_decoded_as_symbols() {
        // 0 -> "1", 1 -> "0": three 0s and a 1 pack to 1110_0000. Each pad
        // bit is also a complete code for byte 1.
        let data = [0u8, 0, 0, 1];
        let codebook = codebook_for(&data);
        let packed = codebook.encode(&data).unwrap();
        assert_eq!(packed, vec![0b1110_0000]);
        assert_eq!(codebook.decode(&packed, 4).unwrap(), data);
    }

    #[test]
    fn test_missing_symbol() {
        let codebook = codebook_for(b"aaab");
        assert!(matches!(
            codebook.encode(b"abc"),
            Err(Error::Huffman(HuffmanError::MissingSymbol { byte: b'c' }))
        ));
    }

    #[test]
    fn test_decode_runs_out_of_bits() {
        let data: Vec<u8> = (0..=255).collect();
        let codebook = codebook_for(&data);
        let packed = codebook.encode(&data).unwrap();
        let result = codebook.decode(&packed[..100], data.len());
        assert!(matches!(result, Err(Error::BitIo(BitIoError::UnexpectedEof))));
    }

    #[test]
    fn test_single_symbol_rejects_one_bit() {
        let codebook = codebook_for(b"A");
        let result = codebook.decode(&[0b0100_0000], 3);
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::InvalidCode { position: 1 }))
        ));
    }
}
