//! Metrics collection and reporting for codec runs.
//!
//! Tracks what a host usually wants to show after compressing or
//! decompressing: sizes, chunk counts, ratio and throughput.
//!
//! # Thread Safety
//!
//! `Metrics` is a plain struct updated by the caller between chunks. The
//! parallel entry points do not touch it; record their results afterwards.

use std::time::{Duration, Instant};

use crate::container::{FrameSummary, Progress, StreamStats};

/// Which direction a run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Decompress,
}

/// Counters and timing for one compress or decompress run.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub operation: Operation,

    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    /// Bytes read by the codec
    pub input_bytes: u64,

    /// Bytes produced by the codec
    pub output_bytes: u64,

    /// Frames written or read
    pub chunks: u64,

    /// Largest decoded chunk seen
    pub largest_chunk: u64,

    /// Distinct symbols summed over all frames (only known for containers)
    pub symbols: u64,
}

impl Metrics {
    /// Start timing a run.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            chunks: 0,
            largest_chunk: 0,
            symbols: 0,
        }
    }

    /// Record a progress snapshot from the container.
    pub fn record_progress(&mut self, progress: &Progress) {
        self.chunks = progress.chunks_done as u64;
        self.input_bytes = progress.bytes_done;
    }

    /// Record the totals of a streaming run.
    pub fn record_stream(&mut self, stats: &StreamStats) {
        self.chunks = stats.chunks as u64;
        self.input_bytes = stats.bytes_in;
        self.output_bytes = stats.bytes_out;
    }

    /// Record per-frame details of a container.
    pub fn record_frames(&mut self, frames: &[FrameSummary]) {
        self.chunks = frames.len() as u64;
        self.symbols = frames.iter().map(|f| f.symbols as u64).sum();
        self.largest_chunk = frames
            .iter()
            .map(|f| f.original_length as u64)
            .max()
            .unwrap_or(0);
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compressed size over raw size, whichever direction the run went.
    ///
    /// Returns 0.0 if nothing raw was processed.
    pub fn compression_ratio(&self) -> f64 {
        let (raw, packed) = match self.operation {
            Operation::Compress => (self.input_bytes, self.output_bytes),
            Operation::Decompress => (self.output_bytes, self.input_bytes),
        };
        if raw == 0 {
            0.0
        } else {
            packed as f64 / raw as f64
        }
    }

    /// Input bytes per second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        let label = match self.operation {
            Operation::Compress => "Compression",
            Operation::Decompress => "Decompression",
        };

        println!("\n=== {} Summary ===", label);
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Input:  {} bytes ({:.2} MiB)", self.input_bytes, mib(self.input_bytes));
        println!("Output: {} bytes ({:.2} MiB)", self.output_bytes, mib(self.output_bytes));
        println!("Chunks: {}", self.chunks);
        if self.largest_chunk > 0 {
            println!("Largest chunk: {} bytes", self.largest_chunk);
        }
        if self.symbols > 0 {
            println!("Avg symbols/chunk: {:.1}", self.symbols as f64 / self.chunks.max(1) as f64);
        }
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }

    /// Export metrics as `key=value` lines (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             chunks={}\n\
             largest_chunk={}\n\
             compression_ratio={:.4}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.chunks,
            self.largest_chunk,
            self.compression_ratio(),
        )
    }
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
