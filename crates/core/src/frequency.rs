//! Byte frequency analysis.
//!
//! A [`FrequencyTable`] maps each byte value present in a buffer to the number
//! of times it occurs. Absent bytes have no entry. Iteration yields entries in
//! the order each byte first appeared; that is the order they are written to
//! a frame header and the order leaves enter the tree builder, so it is part
//! of the format.

/// Occurrence counts for the byte values of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    order: Vec<u8>,
}

impl FrequencyTable {
    /// Scan `data` and count every byte value.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::empty();
        for &byte in data {
            table.add(byte, 1);
        }
        table
    }

    /// Build a table from (byte, count) entries, keeping their order. Zero
    /// counts are skipped and repeated bytes accumulate into their first
    /// position.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u8, u64)>,
    {
        let mut table = Self::empty();
        for (byte, count) in entries {
            table.add(byte, count);
        }
        table
    }

    fn empty() -> Self {
        Self {
            counts: [0; 256],
            order: Vec::new(),
        }
    }

    fn add(&mut self, byte: u8, count: u64) {
        if count == 0 {
            return;
        }
        let slot = &mut self.counts[byte as usize];
        if *slot == 0 {
            self.order.push(byte);
        }
        *slot += count;
    }

    /// Count for `byte`, or `None` if it never occurred.
    pub fn get(&self, byte: u8) -> Option<u64> {
        match self.counts[byte as usize] {
            0 => None,
            count => Some(count),
        }
    }

    /// Number of distinct byte values present.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts (the length of the analysed buffer).
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Present entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.order
            .iter()
            .map(|&byte| (byte, self.counts[byte as usize]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let table = FrequencyTable::from_bytes(&[]);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.total(), 0);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn test_counts_and_absent_bytes() {
        let table = FrequencyTable::from_bytes(&[0, 0, 0, 1]);
        assert_eq!(table.get(0), Some(3));
        assert_eq!(table.get(1), Some(1));
        assert_eq!(table.get(2), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn test_iter_follows_first_appearance() {
        let table = FrequencyTable::from_bytes(b"zebra zebra");
        let bytes: Vec<u8> = table.iter().map(|(b, _)| b).collect();
        assert_eq!(bytes, b"zebra ".to_vec());
    }

    #[test]
    fn test_from_entries_keeps_order_and_merges_repeats() {
        let table = FrequencyTable::from_entries([(9, 1), (3, 2), (9, 4)]);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(9, 5), (3, 2)]);
    }

    #[test]
    fn test_from_entries_matches_scan() {
        let data = b"mississippi";
        let scanned = FrequencyTable::from_bytes(data);
        let rebuilt = FrequencyTable::from_entries(scanned.iter());
        assert_eq!(scanned, rebuilt);
    }

    #[test]
    fn test_from_entries_skips_zero() {
        let table = FrequencyTable::from_entries([(7, 0), (9, 2)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(7), None);
    }
}
