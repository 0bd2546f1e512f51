//! Huffman tree construction.
//!
//! Nodes are merged lowest-frequency first. Ties are broken by insertion
//! order: among nodes of equal frequency the one that entered the queue first
//! leaves it first. Leaves enter in the table's first-appearance order and
//! every merged parent is appended behind all existing nodes, so the shape of
//! the tree is a pure function of the [`FrequencyTable`] and its entry order. This is what lets a decoder
//! rebuild the encoder's tree from the serialized counts alone.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;

/// A node of a Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        byte: u8,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    pub fn freq(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { freq, .. } | HuffmanNode::Internal { freq, .. } => *freq,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }
}

/// A complete prefix-code tree for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffmanNode,
}

impl HuffmanTree {
    /// Build the tree for a non-empty frequency table.
    ///
    /// # Errors
    /// `HuffmanError::EmptyFrequencyTable` if the table has no entries.
    pub fn build(freqs: &FrequencyTable) -> Result<Self> {
        if freqs.is_empty() {
            return Err(HuffmanError::EmptyFrequencyTable.into());
        }

        // Heap keys are (frequency, insertion sequence); the sequence number
        // indexes `slots`, which owns the node until it is dequeued.
        let mut slots: Vec<Option<HuffmanNode>> = Vec::with_capacity(freqs.len() * 2);
        let mut queue = BinaryHeap::with_capacity(freqs.len());

        for (byte, freq) in freqs.iter() {
            queue.push(Reverse((freq, slots.len())));
            slots.push(Some(HuffmanNode::Leaf { byte, freq }));
        }

        while queue.len() > 1 {
            let left = take_min(&mut queue, &mut slots)?;
            let right = take_min(&mut queue, &mut slots)?;
            let freq = left.freq() + right.freq();

            queue.push(Reverse((freq, slots.len())));
            slots.push(Some(HuffmanNode::Internal {
                freq,
                left: Box::new(left),
                right: Box::new(right),
            }));
        }

        let root = take_min(&mut queue, &mut slots)?;
        tracing::trace!(symbols = freqs.len(), total = root.freq(), "built huffman tree");
        Ok(Self { root })
    }

    pub fn root(&self) -> &HuffmanNode {
        &self.root
    }

    /// Number of leaves (distinct symbols).
    pub fn leaf_count(&self) -> usize {
        fn count(node: &HuffmanNode) -> usize {
            match node {
                HuffmanNode::Leaf { .. } => 1,
                HuffmanNode::Internal { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    /// Length of the longest root-to-leaf path. A lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn depth(node: &HuffmanNode) -> usize {
            match node {
                HuffmanNode::Leaf { .. } => 0,
                HuffmanNode::Internal { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }
}

fn take_min(
    queue: &mut BinaryHeap<Reverse<(u64, usize)>>,
    slots: &mut [Option<HuffmanNode>],
) -> Result<HuffmanNode> {
    queue
        .pop()
        .and_then(|Reverse((_, slot))| slots[slot].take())
        .ok_or_else(|| HuffmanError::EmptyFrequencyTable.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8, freq: u64) -> HuffmanNode {
        HuffmanNode::Leaf { byte, freq }
    }

    fn internal(left: HuffmanNode, right: HuffmanNode) -> HuffmanNode {
        HuffmanNode::Internal {
            freq: left.freq() + right.freq(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_empty_table_fails() {
        let result = HuffmanTree::build(&FrequencyTable::from_bytes(&[]));
        assert!(matches!(
            result,
            Err(crate::error::Error::Huffman(HuffmanError::EmptyFrequencyTable))
        ));
    }

    #[test]
    fn test_single_symbol_is_lone_leaf() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"AAAA")).unwrap();
        assert_eq!(tree.root(), &leaf(b'A', 4));
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_two_symbols() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&[0, 0, 0, 1])).unwrap();
        // 1 (freq 1) leaves the queue first and becomes the left child
        assert_eq!(tree.root(), &internal(leaf(1, 1), leaf(0, 3)));
    }

    #[test]
    fn test_tie_break_by_insertion_order() {
        // All four bytes occur once and enter as d,c,b,a: d,c merge first,
        // then b,a, then the two parents in the order they were created.
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"dcba")).unwrap();
        let expected = internal(
            internal(leaf(b'd', 1), leaf(b'c', 1)),
            internal(leaf(b'b', 1), leaf(b'a', 1)),
        );
        assert_eq!(tree.root(), &expected);
    }

    #[test]
    fn test_first_seen_byte_dequeues_first() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"ba")).unwrap();
        assert_eq!(tree.root(), &internal(leaf(b'b', 1), leaf(b'a', 1)));
    }

    #[test]
    fn test_merged_node_queues_behind_equal_leaves() {
        // a=1 b=1 c=2: (a,b) has freq 2 and must dequeue after leaf c.
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"abcc")).unwrap();
        let expected = internal(leaf(b'c', 2), internal(leaf(b'a', 1), leaf(b'b', 1)));
        assert_eq!(tree.root(), &expected);
    }

    #[test]
    fn test_deterministic_shape() {
        let freqs = FrequencyTable::from_bytes(b"the quick brown fox jumps over the lazy dog");
        let first = HuffmanTree::build(&freqs).unwrap();
        for _ in 0..10 {
            assert_eq!(HuffmanTree::build(&freqs).unwrap(), first);
        }
    }

    #[test]
    fn test_root_frequency_is_total() {
        let data: Vec<u8> = (0..=255).chain(0..=31).collect();
        let freqs = FrequencyTable::from_bytes(&data);
        let tree = HuffmanTree::build(&freqs).unwrap();
        assert_eq!(tree.root().freq(), data.len() as u64);
        assert_eq!(tree.leaf_count(), 256);
    }
}
