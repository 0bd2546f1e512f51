//! Error types for the huffzip codec.
//!
//! All operations return structured errors rather than panicking. Corrupt or
//! truncated containers surface as typed failures so the caller can report
//! them instead of emitting partial output.

use thiserror::Error;

/// Top-level error type for every codec operation.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - Huffman: tree or code table construction, encode/decode failures
/// - Format: truncated or corrupt chunk frames
/// - Input policy: inputs larger than the configured limit
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Huffman codec error (e.g., invalid code, decode failure)
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Chunk frame is truncated or internally inconsistent
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A frame declares decoded bytes but carries no frequency table
    #[error("empty tree: frame declares {original_length} bytes but has no symbols")]
    EmptyTree { original_length: u32 },

    /// Input exceeds the caller's size policy or the frame field width
    #[error("input of {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: u64, limit: u64 },

    /// The progress callback asked to stop between chunks
    #[error("operation cancelled after {chunks_completed} chunks")]
    Cancelled { chunks_completed: usize },

    /// A chunk worker thread died
    #[error("worker error: {0}")]
    Worker(String),

    /// File or stream I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// No symbols with non-zero frequency (cannot build a tree)
    #[error("empty frequency table: cannot build tree")]
    EmptyFrequencyTable,

    /// Input contains a byte the code table has no code for
    #[error("byte {byte:#04x} has no code in this table")]
    MissingSymbol { byte: u8 },

    /// Bit sequence does not lead to a leaf
    #[error("invalid huffman code at bit position {position}")]
    InvalidCode { position: usize },

    /// Code length exceeds what a single code word can hold
    #[error("code length {length} exceeds maximum {max}")]
    CodeLengthTooLong { length: usize, max: usize },
}

/// Chunk frame errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Not enough bytes left for the fixed-width length prefix
    #[error("frame too short: need at least {required} bytes, got {actual}")]
    FrameTooShort { required: usize, actual: usize },

    /// header_length is not a whole number of table entries
    #[error("header length {header_length} is not a multiple of {entry_size}")]
    MisalignedHeader {
        header_length: usize,
        entry_size: usize,
    },

    /// header_length points past the end of the buffer
    #[error("header length {header_length} exceeds remaining {available} bytes")]
    HeaderExceedsFrame {
        header_length: usize,
        available: usize,
    },

    /// header_length is larger than a full 256-entry table
    #[error("header length {header_length} exceeds maximum {max}")]
    HeaderTooLong { header_length: usize, max: usize },

    /// A byte value appears twice in one table
    #[error("frequency entry for byte {byte:#04x} is duplicated")]
    DuplicateEntry { byte: u8 },

    /// Table entries must carry a non-zero count
    #[error("frequency entry for byte {byte:#04x} has zero count")]
    ZeroCount { byte: u8 },

    /// Sum of the table counts disagrees with original_length
    #[error("original length {declared} disagrees with frequency total {counted}")]
    LengthMismatch { declared: u64, counted: u64 },

    /// Payload is shorter than the bit count implied by the table
    #[error("payload truncated: need {required} bytes, got {actual}")]
    PayloadTruncated { required: usize, actual: usize },

    /// Bytes left over after a buffer that should hold exactly one frame
    #[error("{extra} trailing bytes after frame")]
    TrailingBytes { extra: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
