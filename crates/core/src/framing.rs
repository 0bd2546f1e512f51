//! Chunk frame serialization and parsing.
//!
//! A chunk frame packages one independently compressed chunk:
//! - Prefix: header length and the number of bytes the chunk decodes to
//! - Header: the chunk's frequency table
//! - Payload: the packed Huffman bitstream
//!
//! # Frame Format
//!
//! ```text
//! +----------------------+
//! | header_length (4)    |  u32 big-endian, bytes of frequency table
//! +----------------------+
//! | original_length (4)  |  u32 big-endian, decoded bytes in this chunk
//! +----------------------+
//! | frequency table      |  header_length / 5 entries of
//! | (variable)           |    byte (1) + count (u32 big-endian, 4)
//! +----------------------+
//! | payload              |  ceil(sum(count * code_len) / 8) bytes
//! | (variable)           |
//! +----------------------+
//! ```
//!
//! The payload length is not stored. The decoder rebuilds the tree from the
//! table and derives it, which is what lets a container reader find the next
//! frame without any outer index.

use crate::error::{Error, FormatError, Result};
use crate::frequency::FrequencyTable;
use crate::huffman::Codebook;

/// Size of the fixed header_length + original_length prefix.
pub const PREFIX_SIZE: usize = 8;

/// Size of one (byte, count) table entry.
pub const ENTRY_SIZE: usize = 5;

/// Largest possible frequency table (all 256 byte values).
pub const MAX_HEADER_LEN: usize = 256 * ENTRY_SIZE;

/// Largest chunk a frame can describe.
pub const MAX_CHUNK_LEN: usize = u32::MAX as usize;

/// A validated frame header together with the codebook it implies.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    header_length: u32,
    original_length: u32,
    freqs: FrequencyTable,
    codebook: Option<Codebook>,
    payload_len: usize,
}

impl FrameHeader {
    /// Read the fixed-width prefix: `(header_length, original_length)`.
    ///
    /// # Errors
    /// - `FormatError::FrameTooShort` if fewer than 8 bytes are available
    /// - `FormatError::HeaderTooLong` / `MisalignedHeader` for an impossible
    ///   header_length, checked before anything allocates for it
    pub fn read_prefix(bytes: &[u8]) -> Result<(u32, u32)> {
        if bytes.len() < PREFIX_SIZE {
            return Err(FormatError::FrameTooShort {
                required: PREFIX_SIZE,
                actual: bytes.len(),
            }
            .into());
        }
        let header_length = read_u32(&bytes[0..4]);
        let original_length = read_u32(&bytes[4..8]);

        let len = header_length as usize;
        if len > MAX_HEADER_LEN {
            return Err(FormatError::HeaderTooLong {
                header_length: len,
                max: MAX_HEADER_LEN,
            }
            .into());
        }
        if len % ENTRY_SIZE != 0 {
            return Err(FormatError::MisalignedHeader {
                header_length: len,
                entry_size: ENTRY_SIZE,
            }
            .into());
        }

        Ok((header_length, original_length))
    }

    /// Validate a frequency table against the prefix and build the codebook.
    ///
    /// # Errors
    /// - `FormatError::DuplicateEntry` / `ZeroCount` for malformed entries
    /// - `Error::EmptyTree` for an empty table with original_length > 0
    /// - `FormatError::LengthMismatch` if the counts do not sum to
    ///   original_length
    pub fn from_table(header_length: u32, original_length: u32, table: &[u8]) -> Result<Self> {
        let mut entries = Vec::with_capacity(table.len() / ENTRY_SIZE);
        let mut seen = [false; 256];
        for entry in table.chunks_exact(ENTRY_SIZE) {
            let byte = entry[0];
            let count = read_u32(&entry[1..5]);
            if std::mem::replace(&mut seen[byte as usize], true) {
                return Err(FormatError::DuplicateEntry { byte }.into());
            }
            if count == 0 {
                return Err(FormatError::ZeroCount { byte }.into());
            }
            entries.push((byte, count as u64));
        }
        let freqs = FrequencyTable::from_entries(entries);

        if freqs.is_empty() {
            if original_length > 0 {
                return Err(Error::EmptyTree { original_length });
            }
            return Ok(Self {
                header_length,
                original_length,
                freqs,
                codebook: None,
                payload_len: 0,
            });
        }

        let counted = freqs.total();
        if counted != original_length as u64 {
            return Err(FormatError::LengthMismatch {
                declared: original_length as u64,
                counted,
            }
            .into());
        }

        let codebook = Codebook::from_frequencies(&freqs)?;
        let payload_len = codebook.encoded_bits(&freqs).div_ceil(8) as usize;

        Ok(Self {
            header_length,
            original_length,
            freqs,
            codebook: Some(codebook),
            payload_len,
        })
    }

    /// Parse prefix and table from the start of `bytes`.
    ///
    /// # Errors
    /// `FormatError::HeaderExceedsFrame` if the table is cut short, plus
    /// everything [`read_prefix`](Self::read_prefix) and
    /// [`from_table`](Self::from_table) report.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let (header_length, original_length) = Self::read_prefix(bytes)?;
        let rest = &bytes[PREFIX_SIZE..];
        let len = header_length as usize;
        if rest.len() < len {
            return Err(FormatError::HeaderExceedsFrame {
                header_length: len,
                available: rest.len(),
            }
            .into());
        }
        Self::from_table(header_length, original_length, &rest[..len])
    }

    pub fn header_length(&self) -> u32 {
        self.header_length
    }

    pub fn original_length(&self) -> u32 {
        self.original_length
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.freqs
    }

    pub fn codebook(&self) -> Option<&Codebook> {
        self.codebook.as_ref()
    }

    /// Bytes taken by prefix and table.
    pub fn encoded_len(&self) -> usize {
        PREFIX_SIZE + self.header_length as usize
    }

    /// Bytes of packed payload that follow the table.
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Total size of the frame on the wire.
    pub fn frame_len(&self) -> usize {
        self.encoded_len() + self.payload_len
    }

    /// Decode the payload that follows this header.
    ///
    /// # Errors
    /// `FormatError::PayloadTruncated` if `payload` is shorter than
    /// [`payload_len`](Self::payload_len).
    pub fn decode_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() < self.payload_len {
            return Err(FormatError::PayloadTruncated {
                required: self.payload_len,
                actual: payload.len(),
            }
            .into());
        }
        match &self.codebook {
            Some(codebook) => {
                codebook.decode(&payload[..self.payload_len], self.original_length as usize)
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Compress one chunk into a self-describing frame.
///
/// An empty chunk yields an 8-byte frame with an empty table and no payload.
///
/// # Errors
/// `Error::InputTooLarge` if the chunk is longer than `u32::MAX` bytes.
pub fn compress_chunk(data: &[u8]) -> Result<Vec<u8>> {
    let mut frame = Vec::new();
    compress_chunk_into(data, &mut frame)?;
    Ok(frame)
}

/// Compress one chunk, appending the frame to `out`.
pub fn compress_chunk_into(data: &[u8], out: &mut Vec<u8>) -> Result<()> {
    if data.len() > MAX_CHUNK_LEN {
        return Err(Error::InputTooLarge {
            size: data.len() as u64,
            limit: MAX_CHUNK_LEN as u64,
        });
    }

    let freqs = FrequencyTable::from_bytes(data);
    let header_length = freqs.len() * ENTRY_SIZE;

    out.extend_from_slice(&(header_length as u32).to_be_bytes());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());

    if freqs.is_empty() {
        return Ok(());
    }

    for (byte, count) in freqs.iter() {
        out.push(byte);
        out.extend_from_slice(&(count as u32).to_be_bytes());
    }

    let codebook = Codebook::from_frequencies(&freqs)?;
    let payload = codebook.encode(data)?;
    tracing::trace!(
        raw_len = data.len(),
        symbols = freqs.len(),
        payload_len = payload.len(),
        "framed chunk"
    );
    out.extend_from_slice(&payload);
    Ok(())
}

/// Decode the frame at the start of `bytes`.
///
/// Returns the decoded chunk and the number of bytes the frame occupied;
/// anything after that is left for the caller.
pub fn decode_frame(bytes: &[u8]) -> Result<(Vec<u8>, usize)> {
    let header = FrameHeader::parse(bytes)?;
    let payload = &bytes[header.encoded_len()..];
    let decoded = header.decode_payload(payload)?;
    Ok((decoded, header.frame_len()))
}

/// Decompress a buffer holding exactly one frame.
///
/// # Errors
/// `FormatError::TrailingBytes` if bytes remain after the frame, plus every
/// error [`decode_frame`] reports.
pub fn decompress_chunk(framed: &[u8]) -> Result<Vec<u8>> {
    let (decoded, consumed) = decode_frame(framed)?;
    if consumed != framed.len() {
        return Err(FormatError::TrailingBytes {
            extra: framed.len() - consumed,
        }
        .into());
    }
    Ok(decoded)
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
