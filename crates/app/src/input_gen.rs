//! Sample input generation for the `roundtrip` command.
//!
//! When no input file is given we synthesize data whose compressibility
//! varies section by section, so per-chunk frequency tables actually differ:
//! - runs of one byte (a single-symbol tree)
//! - English-like text over a small alphabet
//! - short repeating binary patterns
//! - uniformly random bytes (close to incompressible)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SECTION_BYTES: usize = 8192;

const WORDS: &[&str] = &[
    "the", "of", "and", "huffman", "tree", "chunk", "frame", "code", "table", "byte", "stream",
    "prefix", "leaf", "bit", "count",
];

/// Generate `size_bytes` of mixed-compressibility data from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes + SECTION_BYTES);

    while data.len() < size_bytes {
        let section = SECTION_BYTES.min(size_bytes - data.len());
        match rng.gen_range(0..10u8) {
            0..=2 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(section));
            }
            3..=5 => push_text(&mut rng, &mut data, section),
            6..=7 => {
                let pattern: Vec<u8> = (0..rng.gen_range(4..=32)).map(|_| rng.gen()).collect();
                data.extend(pattern.iter().cycle().take(section));
            }
            _ => data.extend((0..section).map(|_| rng.gen::<u8>())),
        }
    }

    data.truncate(size_bytes);
    data
}

fn push_text(rng: &mut ChaCha8Rng, data: &mut Vec<u8>, len: usize) {
    let end = data.len() + len;
    while data.len() < end {
        let word = WORDS[rng.gen_range(0..WORDS.len())];
        data.extend_from_slice(word.as_bytes());
        data.push(match rng.gen_range(0..12u8) {
            0 => b'.',
            1 => b'\n',
            _ => b' ',
        });
    }
    data.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_various_sizes() {
        for size in [0, 1, 100, 8192, 8193, 100_000] {
            assert_eq!(generate_sample_data(999, size).len(), size);
        }
    }

    #[test]
    fn test_determinism() {
        assert_eq!(generate_sample_data(12345, 50_000), generate_sample_data(12345, 50_000));
    }

    #[test]
    fn test_different_seeds() {
        assert_ne!(generate_sample_data(1, 50_000), generate_sample_data(2, 50_000));
    }

    #[test]
    fn test_sample_compresses() {
        let data = generate_sample_data(7, 200_000);
        let packed = huffzip_core::compress(&data, 16 * 1024).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(huffzip_core::decompress(&packed).unwrap(), data);
    }
}
