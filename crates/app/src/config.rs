//! Configuration for the huffzip command-line tool.
//!
//! Command-line flags are parsed with clap and resolved into a [`Config`]
//! with every default filled in, so a run can be printed and reproduced.

use clap::{Args, Parser, Subcommand};
use huffzip_core::container::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_INPUT_BYTES};
use huffzip_core::{ContainerOptions, Error, Result};
use std::path::{Path, PathBuf};

/// Extension appended to compressed files.
pub const COMPRESSED_EXTENSION: &str = "huff";

#[derive(Debug, Parser)]
#[command(name = "huffzip", version, about = "Chunked Huffman compression")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress a file into a .huff container
    Compress(FileArgs),
    /// Decompress a .huff container
    Decompress(FileArgs),
    /// Compress then decompress in memory and verify the result
    Roundtrip(RoundtripArgs),
}

#[derive(Debug, Args)]
pub struct CodecArgs {
    /// Chunk size in bytes
    #[arg(long = "chunk-bytes", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_bytes: usize,

    /// Worker threads (1 = sequential, streaming)
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// Refuse inputs larger than this (0 = no limit)
    #[arg(long = "max-input-bytes", default_value_t = DEFAULT_MAX_INPUT_BYTES)]
    pub max_input_bytes: u64,

    /// Print resolved configuration
    #[arg(long = "print-config")]
    pub print_config: bool,

    /// Don't print metrics summary
    #[arg(long = "no-metrics")]
    pub no_metrics: bool,
}

#[derive(Debug, Args)]
pub struct FileArgs {
    /// Input file
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Output file (default derived from the input name)
    #[arg(long = "out")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub codec: CodecArgs,
}

#[derive(Debug, Args)]
pub struct RoundtripArgs {
    /// Input file (default: generate sample data)
    #[arg(long = "in")]
    pub input: Option<PathBuf>,

    /// Seed for generated sample data
    #[arg(long)]
    pub seed: Option<u64>,

    /// Size of generated sample data
    #[arg(long = "sample-bytes", default_value_t = 4 * 1024 * 1024)]
    pub sample_bytes: usize,

    #[command(flatten)]
    pub codec: CodecArgs,
}

/// What a run should do, with every default resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Compress { input: PathBuf, output: PathBuf },
    Decompress { input: PathBuf, output: PathBuf },
    Roundtrip { input: Option<PathBuf>, seed: u64, sample_bytes: usize },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    /// Chunking, workers and size limit handed to the codec
    pub options: ContainerOptions,

    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print the metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Resolve parsed arguments into a validated configuration.
    ///
    /// # Errors
    /// `Error::Config` for an invalid chunk size or worker count, or when a
    /// decompress output name cannot be derived.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let (mode, codec) = match cli.command {
            Command::Compress(args) => {
                let output = args
                    .output
                    .unwrap_or_else(|| compressed_name(&args.input));
                (
                    Mode::Compress {
                        input: args.input,
                        output,
                    },
                    args.codec,
                )
            }
            Command::Decompress(args) => {
                let output = match args.output {
                    Some(path) => path,
                    None => decompressed_name(&args.input)?,
                };
                (
                    Mode::Decompress {
                        input: args.input,
                        output,
                    },
                    args.codec,
                )
            }
            Command::Roundtrip(args) => {
                let seed = args.seed.unwrap_or_else(time_seed);
                (
                    Mode::Roundtrip {
                        input: args.input,
                        seed,
                        sample_bytes: args.sample_bytes,
                    },
                    args.codec,
                )
            }
        };

        let options = ContainerOptions {
            chunk_size: codec.chunk_bytes,
            workers: codec.workers,
            max_input_bytes: match codec.max_input_bytes {
                0 => None,
                limit => Some(limit),
            },
        };
        options.validate()?;

        Ok(Self {
            mode,
            options,
            print_config: codec.print_config,
            print_metrics: !codec.no_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.mode {
            Mode::Compress { input, output } => {
                println!("Mode: compress");
                println!("Input file:  {}", input.display());
                println!("Output file: {}", output.display());
            }
            Mode::Decompress { input, output } => {
                println!("Mode: decompress");
                println!("Input file:  {}", input.display());
                println!("Output file: {}", output.display());
            }
            Mode::Roundtrip {
                input,
                seed,
                sample_bytes,
            } => {
                println!("Mode: roundtrip");
                match input {
                    Some(path) => println!("Input file: {}", path.display()),
                    None => println!("Input: {} generated bytes (seed {})", sample_bytes, seed),
                }
            }
        }
        println!();
        println!(
            "Chunk size: {} bytes ({} KiB)",
            self.options.chunk_size,
            self.options.chunk_size / 1024
        );
        println!("Workers: {}", self.options.workers);
        match self.options.max_input_bytes {
            Some(limit) => println!("Input limit: {} bytes", limit),
            None => println!("Input limit: none"),
        }
        println!();
    }
}

/// `notes.txt` -> `notes.txt.huff`
pub fn compressed_name(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}

/// `notes.txt.huff` -> `notes.txt`
///
/// # Errors
/// `Error::Config` if the input has no `.huff` extension.
pub fn decompressed_name(input: &Path) -> Result<PathBuf> {
    match input.extension() {
        Some(ext) if ext == COMPRESSED_EXTENSION => Ok(input.with_extension("")),
        _ => Err(Error::Config(format!(
            "cannot derive output name from {}; pass --out",
            input.display()
        ))),
    }
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
