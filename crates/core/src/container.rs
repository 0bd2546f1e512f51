//! Container assembly: splitting an input into chunks and joining frames.
//!
//! A container is nothing but frames laid end to end. Every frame carries
//! enough to find its own end, so a reader walks the buffer linearly:
//! parse a header, derive the payload length, decode, advance.
//!
//! # Memory
//!
//! The in-memory entry points hold the whole input and output. The
//! [`compress_stream`] / [`decompress_stream`] adapters hold one chunk (and
//! its frame) at a time.
//!
//! # Concurrency
//!
//! Chunks share no state, so [`compress_parallel`] and
//! [`decompress_parallel`] hand contiguous runs of chunks to scoped worker
//! threads and stitch the results back together in chunk order. Their output
//! is byte-identical to the sequential path.

use std::io::{Read, Write};
use std::ops::ControlFlow;
use std::thread;

use crate::error::{Error, FormatError, Result};
use crate::framing::{self, FrameHeader, MAX_CHUNK_LEN, PREFIX_SIZE};

/// Default chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1_048_576;

/// Default input size limit used by hosts (100 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 100 * 1024 * 1024;

/// Knobs for the container entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Bytes per chunk; the last chunk may be shorter.
    pub chunk_size: usize,

    /// Worker threads for the parallel entry points.
    pub workers: usize,

    /// Reject inputs larger than this many bytes. `None` disables the check.
    pub max_input_bytes: Option<u64>,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: 1,
            max_input_bytes: Some(DEFAULT_MAX_INPUT_BYTES),
        }
    }
}

impl ContainerOptions {
    /// Default chunking on one worker, with no input size limit.
    pub fn unlimited() -> Self {
        Self {
            max_input_bytes: None,
            ..Self::default()
        }
    }

    /// Options with the given chunk size, one worker and no size limit.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::unlimited()
        }
    }

    /// # Errors
    /// `Error::Config` if `chunk_size` is 0 or wider than a frame's length
    /// field, or if `workers` is 0.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1 byte".to_string()));
        }
        if self.chunk_size > MAX_CHUNK_LEN {
            return Err(Error::Config(format!(
                "chunk size {} exceeds maximum {}",
                self.chunk_size, MAX_CHUNK_LEN
            )));
        }
        if self.workers == 0 {
            return Err(Error::Config("worker count must be at least 1".to_string()));
        }
        Ok(())
    }

    /// # Errors
    /// `Error::InputTooLarge` if `size` exceeds `max_input_bytes`.
    pub fn check_input_size(&self, size: u64) -> Result<()> {
        match self.max_input_bytes {
            Some(limit) if size > limit => Err(Error::InputTooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}

/// Snapshot handed to progress callbacks after every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Chunks finished so far.
    pub chunks_done: usize,

    /// Input bytes consumed so far.
    pub bytes_done: u64,

    /// Total input bytes, when known up front.
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Completed fraction in `[0, 1]`, if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                1.0
            } else {
                self.bytes_done as f64 / total as f64
            }
        })
    }
}

/// Byte counts reported by the streaming adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub chunks: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Location and shape of one frame inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSummary {
    pub index: usize,
    pub offset: usize,
    pub header_length: u32,
    pub original_length: u32,
    pub symbols: usize,
    pub payload_len: usize,
    pub frame_len: usize,
}

/// Compress `input` as consecutive frames of at most `chunk_size` bytes each.
///
/// An empty input still produces one (empty) frame.
pub fn compress(input: &[u8], chunk_size: usize) -> Result<Vec<u8>> {
    compress_with_progress(input, &ContainerOptions::with_chunk_size(chunk_size), |_| {
        ControlFlow::Continue(())
    })
}

/// Decompress a container back into the original bytes.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    decompress_with_progress(input, &ContainerOptions::unlimited(), |_| ControlFlow::Continue(()))
}

/// Compress chunk by chunk, reporting after each one.
///
/// Returning `ControlFlow::Break` from `progress` stops before the next chunk
/// and yields `Error::Cancelled`. A chunk is never abandoned half-written.
pub fn compress_with_progress<F>(
    input: &[u8],
    options: &ContainerOptions,
    mut progress: F,
) -> Result<Vec<u8>>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    options.validate()?;
    options.check_input_size(input.len() as u64)?;

    let chunks = split_chunks(input, options.chunk_size);
    let total_chunks = chunks.len();
    let mut output = Vec::with_capacity(input.len() / 2 + PREFIX_SIZE);
    let mut bytes_done = 0u64;

    for (index, chunk) in chunks.into_iter().enumerate() {
        let start = output.len();
        framing::compress_chunk_into(chunk, &mut output)?;
        bytes_done += chunk.len() as u64;
        tracing::debug!(
            chunk = index,
            raw_len = chunk.len(),
            frame_len = output.len() - start,
            "compressed chunk"
        );

        let snapshot = Progress {
            chunks_done: index + 1,
            bytes_done,
            total_bytes: Some(input.len() as u64),
        };
        if progress(snapshot).is_break() && index + 1 < total_chunks {
            return Err(Error::Cancelled {
                chunks_completed: index + 1,
            });
        }
    }

    Ok(output)
}

/// Decompress frame by frame, reporting after each one.
///
/// Any bad frame aborts the whole operation; no partial output is returned.
/// `bytes_done` / `total_bytes` in the snapshots count container bytes.
pub fn decompress_with_progress<F>(
    input: &[u8],
    options: &ContainerOptions,
    mut progress: F,
) -> Result<Vec<u8>>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    options.check_input_size(input.len() as u64)?;

    let mut output = Vec::with_capacity(input.len() * 2);
    let mut offset = 0;
    let mut index = 0;

    while offset < input.len() {
        let (decoded, consumed) = framing::decode_frame(&input[offset..]).map_err(|err| {
            tracing::warn!(chunk = index, offset, error = %err, "rejecting corrupt frame");
            err
        })?;
        output.extend_from_slice(&decoded);
        offset += consumed;
        index += 1;
        tracing::debug!(chunk = index - 1, frame_len = consumed, raw_len = decoded.len(), "decompressed chunk");

        let snapshot = Progress {
            chunks_done: index,
            bytes_done: offset as u64,
            total_bytes: Some(input.len() as u64),
        };
        if progress(snapshot).is_break() && offset < input.len() {
            return Err(Error::Cancelled {
                chunks_completed: index,
            });
        }
    }

    Ok(output)
}

/// Compress chunks on `options.workers` threads. Output matches [`compress`].
pub fn compress_parallel(input: &[u8], options: &ContainerOptions) -> Result<Vec<u8>> {
    options.validate()?;
    options.check_input_size(input.len() as u64)?;

    let chunks = split_chunks(input, options.chunk_size);
    let frames = run_in_order(&chunks, options.workers, |chunk| framing::compress_chunk(chunk))?;

    tracing::debug!(chunks = frames.len(), workers = options.workers, "parallel compression finished");
    Ok(frames.concat())
}

/// Decompress frames on `options.workers` threads. Output matches
/// [`decompress`].
///
/// Frame boundaries are found by a sequential header scan first; only
/// payload decoding runs in parallel.
pub fn decompress_parallel(input: &[u8], options: &ContainerOptions) -> Result<Vec<u8>> {
    options.validate()?;
    options.check_input_size(input.len() as u64)?;

    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < input.len() {
        let header = FrameHeader::parse(&input[offset..])?;
        let payload_start = offset + header.encoded_len();
        let available = input.len() - payload_start;
        if available < header.payload_len() {
            return Err(FormatError::PayloadTruncated {
                required: header.payload_len(),
                actual: available,
            }
            .into());
        }
        let payload = &input[payload_start..payload_start + header.payload_len()];
        offset += header.frame_len();
        frames.push((header, payload));
    }

    let decoded = run_in_order(&frames, options.workers, |(header, payload)| {
        header.decode_payload(payload)
    })?;
    Ok(decoded.concat())
}

/// Compress from a reader to a writer one chunk at a time.
///
/// `total_bytes` in the progress snapshots is `None`: the input length is
/// not known in advance. The reader is peeked one byte past every full chunk,
/// so a `Break` after the final chunk is ignored here exactly as in
/// [`compress_with_progress`].
pub fn compress_stream<R, W, F>(
    mut reader: R,
    mut writer: W,
    options: &ContainerOptions,
    mut progress: F,
) -> Result<StreamStats>
where
    R: Read,
    W: Write,
    F: FnMut(Progress) -> ControlFlow<()>,
{
    options.validate()?;

    let mut stats = StreamStats::default();
    let mut chunk = Vec::with_capacity(options.chunk_size.min(DEFAULT_CHUNK_SIZE));
    let mut frame = Vec::new();
    let mut carry: Option<u8> = None;

    loop {
        chunk.clear();
        chunk.extend(carry.take());
        (&mut reader)
            .take((options.chunk_size - chunk.len()) as u64)
            .read_to_end(&mut chunk)?;

        let mut next = [0u8; 1];
        let last = chunk.len() < options.chunk_size || read_full(&mut reader, &mut next)? == 0;
        if !last {
            carry = Some(next[0]);
        }

        stats.bytes_in += chunk.len() as u64;
        options.check_input_size(stats.bytes_in)?;

        frame.clear();
        framing::compress_chunk_into(&chunk, &mut frame)?;
        writer.write_all(&frame)?;
        stats.bytes_out += frame.len() as u64;
        stats.chunks += 1;
        tracing::debug!(chunk = stats.chunks - 1, raw_len = chunk.len(), frame_len = frame.len(), "compressed chunk");

        let snapshot = Progress {
            chunks_done: stats.chunks,
            bytes_done: stats.bytes_in,
            total_bytes: None,
        };
        if progress(snapshot).is_break() && !last {
            return Err(Error::Cancelled {
                chunks_completed: stats.chunks,
            });
        }
        if last {
            break;
        }
    }

    writer.flush()?;
    Ok(stats)
}

/// Decompress from a reader to a writer one frame at a time.
pub fn decompress_stream<R, W>(mut reader: R, mut writer: W) -> Result<StreamStats>
where
    R: Read,
    W: Write,
{
    let mut stats = StreamStats::default();
    let mut prefix = [0u8; PREFIX_SIZE];
    let mut table = Vec::new();
    let mut payload = Vec::new();

    loop {
        let got = read_full(&mut reader, &mut prefix)?;
        if got == 0 {
            break;
        }
        if got < PREFIX_SIZE {
            return Err(FormatError::FrameTooShort {
                required: PREFIX_SIZE,
                actual: got,
            }
            .into());
        }
        let (header_length, original_length) = FrameHeader::read_prefix(&prefix)?;

        table.resize(header_length as usize, 0);
        let got = read_full(&mut reader, &mut table)?;
        if got < table.len() {
            return Err(FormatError::HeaderExceedsFrame {
                header_length: table.len(),
                available: got,
            }
            .into());
        }
        let header = FrameHeader::from_table(header_length, original_length, &table)?;

        // Grows as bytes arrive instead of trusting the declared length.
        payload.clear();
        (&mut reader)
            .take(header.payload_len() as u64)
            .read_to_end(&mut payload)?;
        let decoded = header.decode_payload(&payload)?;

        writer.write_all(&decoded)?;
        stats.chunks += 1;
        stats.bytes_in += header.frame_len() as u64;
        stats.bytes_out += decoded.len() as u64;
        tracing::debug!(chunk = stats.chunks - 1, frame_len = header.frame_len(), raw_len = decoded.len(), "decompressed chunk");
    }

    writer.flush()?;
    Ok(stats)
}

/// List every frame in a container without decoding payloads.
pub fn frame_summaries(input: &[u8]) -> Result<Vec<FrameSummary>> {
    let mut summaries = Vec::new();
    let mut offset = 0;
    while offset < input.len() {
        let header = FrameHeader::parse(&input[offset..])?;
        let available = input.len() - offset;
        if available < header.frame_len() {
            return Err(FormatError::PayloadTruncated {
                required: header.payload_len(),
                actual: available - header.encoded_len(),
            }
            .into());
        }
        summaries.push(FrameSummary {
            index: summaries.len(),
            offset,
            header_length: header.header_length(),
            original_length: header.original_length(),
            symbols: header.frequencies().len(),
            payload_len: header.payload_len(),
            frame_len: header.frame_len(),
        });
        offset += header.frame_len();
    }
    Ok(summaries)
}

fn split_chunks(input: &[u8], chunk_size: usize) -> Vec<&[u8]> {
    if input.is_empty() {
        return vec![input];
    }
    input.chunks(chunk_size).collect()
}

/// Apply `work` to every item on up to `workers` threads; results come back
/// in item order. The first error (in item order) wins.
fn run_in_order<T, U, F>(items: &[T], workers: usize, work: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Result<U> + Sync,
{
    if workers <= 1 || items.len() <= 1 {
        return items.iter().map(&work).collect();
    }

    let per_worker = items.len().div_ceil(workers);
    let work = &work;

    let batches: Vec<Result<Vec<U>>> = thread::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(per_worker)
            .map(|batch| scope.spawn(move || batch.iter().map(work).collect::<Result<Vec<U>>>()))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::Worker("chunk worker panicked".to_string())))
            })
            .collect()
    });

    let mut results = Vec::with_capacity(items.len());
    for batch in batches {
        results.extend(batch?);
    }
    Ok(results)
}

/// Fill `buf` from `reader`, returning fewer bytes only at end of input.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(filled)
}
