//! huffzip-core: chunked Huffman compression with a self-framing container
//!
//! This library compresses arbitrarily large inputs under bounded memory by
//! splitting them into chunks that are Huffman-coded and framed
//! independently. A container is simply the concatenation of those frames.
//!
//! # Architecture
//!
//! Modules, leaf-first:
//! - `frequency`: byte frequency analysis
//! - `tree`: Huffman tree construction with a deterministic tie-break
//! - `codes`: code table generation from the tree
//! - `bitio`: MSB-first bit writer/reader
//! - `huffman`: codebook (tree + codes), bitstream packing/unpacking
//! - `framing`: per-chunk frame format (the chunk codec)
//! - `container`: chunk splitting and frame joining, parallel and streaming
//! - `metrics`: observable run statistics
//!
//! # Example
//! ```
//! let data = b"abracadabra".repeat(100);
//! let packed = huffzip_core::compress(&data, 256).unwrap();
//! assert_eq!(huffzip_core::decompress(&packed).unwrap(), data);
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: all errors are structured and recoverable
//! - **No shared state**: every tree and table lives for one chunk only
//! - **Deterministic**: the tree is a pure function of the chunk's counts

pub mod bitio;
pub mod codes;
pub mod container;
pub mod error;
pub mod framing;
pub mod frequency;
pub mod huffman;
pub mod metrics;
pub mod tree;

// Re-export commonly used types
pub use container::{
    compress, compress_parallel, compress_stream, compress_with_progress, decompress,
    decompress_parallel, decompress_stream, decompress_with_progress, ContainerOptions, Progress,
    DEFAULT_CHUNK_SIZE,
};
pub use error::{Error, Result};
pub use framing::{compress_chunk, decompress_chunk};
