//! Code table generation.
//!
//! Walking the tree from the root, a left edge appends `0` and a right edge
//! appends `1`; the accumulated bits at a leaf are that byte's code. Codes are
//! prefix-free because every code ends at a leaf and leaves have no children.

use std::fmt;

use crate::error::{HuffmanError, Result};
use crate::tree::{HuffmanNode, HuffmanTree};

/// Longest code a [`Code`] can hold.
pub const MAX_CODE_LEN: usize = 64;

/// A variable-length bit code, stored right-aligned in `bits`.
///
/// The first bit of the code is bit `len - 1` of `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u64,
    len: u8,
}

impl Code {
    pub fn new(bits: u64, len: u8) -> Self {
        Self { bits, len }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (other.bits >> (other.len - self.len)) == self.bits
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            let bit = (self.bits >> i) & 1;
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

/// Mapping from byte value to its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<Code>; 256],
}

impl CodeTable {
    /// Derive the code for every leaf of `tree`.
    ///
    /// A tree that is a lone leaf gets the one-bit code `0`, otherwise its
    /// byte would encode to zero bits.
    ///
    /// # Errors
    /// `HuffmanError::CodeLengthTooLong` if a leaf is deeper than
    /// [`MAX_CODE_LEN`].
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut codes = [None; 256];
        match tree.root() {
            HuffmanNode::Leaf { byte, .. } => {
                codes[*byte as usize] = Some(Code::new(0, 1));
            }
            root => assign(root, 0, 0, &mut codes)?,
        }
        Ok(Self { codes })
    }

    pub fn get(&self, byte: u8) -> Option<Code> {
        self.codes[byte as usize]
    }

    /// Number of bytes with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in ascending byte order (not the header order).
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(byte, code)| code.map(|c| (byte as u8, c)))
    }
}

// Recursion depth is bounded by the tree depth, itself at most 255 for a
// 256-symbol alphabet.
fn assign(node: &HuffmanNode, bits: u64, len: usize, codes: &mut [Option<Code>; 256]) -> Result<()> {
    match node {
        HuffmanNode::Leaf { byte, .. } => {
            codes[*byte as usize] = Some(Code::new(bits, len as u8));
            Ok(())
        }
        HuffmanNode::Internal { left, right, .. } => {
            if len + 1 > MAX_CODE_LEN {
                return Err(HuffmanError::CodeLengthTooLong {
                    length: len + 1,
                    max: MAX_CODE_LEN,
                }
                .into());
            }
            assign(left, bits << 1, len + 1, codes)?;
            assign(right, (bits << 1) | 1, len + 1, codes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;

    fn table_for(data: &[u8]) -> CodeTable {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap();
        CodeTable::from_tree(&tree).unwrap()
    }

    fn assert_prefix_free(table: &CodeTable) {
        let codes: Vec<(u8, Code)> = table.iter().collect();
        for (i, (a_byte, a)) in codes.iter().enumerate() {
            for (j, (b_byte, b)) in codes.iter().enumerate() {
                if i != j {
                    assert!(
                        !a.is_prefix_of(b),
                        "code {} for {} is a prefix of {} for {}",
                        a,
                        a_byte,
                        b,
                        b_byte
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let table = table_for(&[65]);
        let code = table.get(65).unwrap();
        assert_eq!(code.len(), 1);
        assert_eq!(code.to_string(), "0");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_two_symbols() {
        let table = table_for(&[0, 0, 0, 1]);
        assert_eq!(table.get(1).unwrap().to_string(), "0");
        assert_eq!(table.get(0).unwrap().to_string(), "1");
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_tie_goes_to_first_seen_byte() {
        let table = table_for(b"ba");
        assert_eq!(table.get(b'b').unwrap().to_string(), "0");
        assert_eq!(table.get(b'a').unwrap().to_string(), "1");
    }

    #[test]
    fn test_skewed_lengths() {
        // a:1 b:1 c:2 d:4 -> d is shortest
        let table = table_for(b"abccdddd");
        assert_eq!(table.get(b'd').unwrap().to_string(), "0");
        assert_eq!(table.get(b'c').unwrap().to_string(), "10");
        assert_eq!(table.get(b'a').unwrap().to_string(), "110");
        assert_eq!(table.get(b'b').unwrap().to_string(), "111");
    }

    #[test]
    fn test_every_symbol_has_code() {
        let data: Vec<u8> = (0..=255).collect();
        let table = table_for(&data);
        assert_eq!(table.len(), 256);
        for byte in 0..=255u8 {
            assert_eq!(table.get(byte).unwrap().len(), 8);
        }
    }

    #[test]
    fn test_prefix_free() {
        let inputs: [&[u8]; 4] = [
            b"abracadabra",
            b"the quick brown fox jumps over the lazy dog",
            &[1, 2, 2, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5],
            &[0, 0, 0, 1],
        ];
        for data in inputs {
            assert_prefix_free(&table_for(data));
        }
    }

    #[test]
    fn test_fibonacci_depth() {
        // Fibonacci frequencies give the deepest possible tree.
        let mut fib = vec![1u64, 1];
        while fib.len() < 30 {
            let n = fib[fib.len() - 1] + fib[fib.len() - 2];
            fib.push(n);
        }
        let freqs = FrequencyTable::from_entries(fib.iter().enumerate().map(|(i, &f)| (i as u8, f)));
        let tree = HuffmanTree::build(&freqs).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();
        assert_eq!(tree.depth(), 29);
        assert_prefix_free(&table);
    }

    #[test]
    fn test_is_prefix_of() {
        let short = Code::new(0b10, 2);
        let long = Code::new(0b101, 3);
        let other = Code::new(0b111, 3);
        assert!(short.is_prefix_of(&long));
        assert!(!short.is_prefix_of(&other));
        assert!(!long.is_prefix_of(&short));
    }
}
