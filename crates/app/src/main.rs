//! huffzip: compress and decompress files with the chunked Huffman codec.
//!
//! With one worker, files are streamed chunk by chunk so memory stays at
//! roughly one chunk. With more workers the whole file is loaded and chunks
//! are processed in parallel.

mod config;
mod input_gen;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use huffzip_core::container::{self, Progress};
use huffzip_core::metrics::{Metrics, Operation};
use huffzip_core::{Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Cli, Config, Mode};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();
    let result = Config::from_cli(cli).and_then(|config| run(&config));

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Execute one configured run. Returns whether it verified successfully.
fn run(config: &Config) -> Result<bool> {
    if config.print_config {
        config.print();
    }

    match &config.mode {
        Mode::Compress { input, output } => {
            let metrics = compress_file(config, input, output)?;
            report(config, &metrics);
            Ok(true)
        }
        Mode::Decompress { input, output } => {
            let metrics = decompress_file(config, input, output)?;
            report(config, &metrics);
            Ok(true)
        }
        Mode::Roundtrip {
            input,
            seed,
            sample_bytes,
        } => {
            let data = match input {
                Some(path) => std::fs::read(path)?,
                None => input_gen::generate_sample_data(*seed, *sample_bytes),
            };
            roundtrip(config, &data)
        }
    }
}

fn compress_file(config: &Config, input: &Path, output: &Path) -> Result<Metrics> {
    let options = &config.options;
    options.check_input_size(std::fs::metadata(input)?.len())?;
    let mut metrics = Metrics::new(Operation::Compress);

    if options.workers > 1 {
        let data = std::fs::read(input)?;
        let packed = container::compress_parallel(&data, options)?;
        write_output(output, |mut writer| {
            writer.write_all(&packed)?;
            writer.flush()?;
            Ok(())
        })?;
        metrics.input_bytes = data.len() as u64;
        metrics.output_bytes = packed.len() as u64;
        metrics.record_frames(&container::frame_summaries(&packed)?);
    } else {
        let reader = BufReader::new(File::open(input)?);
        let stats = write_output(output, |writer| {
            container::compress_stream(reader, writer, options, log_progress)
        })?;
        metrics.record_stream(&stats);
    }

    metrics.complete();
    tracing::info!(input = %input.display(), output = %output.display(), "compress finished");
    Ok(metrics)
}

fn decompress_file(config: &Config, input: &Path, output: &Path) -> Result<Metrics> {
    let options = &config.options;
    options.check_input_size(std::fs::metadata(input)?.len())?;
    let mut metrics = Metrics::new(Operation::Decompress);

    if options.workers > 1 {
        let packed = std::fs::read(input)?;
        let data = container::decompress_parallel(&packed, options)?;
        write_output(output, |mut writer| {
            writer.write_all(&data)?;
            writer.flush()?;
            Ok(())
        })?;
        metrics.record_frames(&container::frame_summaries(&packed)?);
        metrics.input_bytes = packed.len() as u64;
        metrics.output_bytes = data.len() as u64;
    } else {
        let reader = BufReader::new(File::open(input)?);
        let stats = write_output(output, |writer| container::decompress_stream(reader, writer))?;
        metrics.record_stream(&stats);
    }

    metrics.complete();
    tracing::info!(input = %input.display(), output = %output.display(), "decompress finished");
    Ok(metrics)
}

/// Write through `<output>.partial` and rename it over `output` only once
/// `write` succeeds. On failure the partial file is removed and any existing
/// `output` is left untouched.
fn write_output<T, F>(output: &Path, write: F) -> Result<T>
where
    F: FnOnce(BufWriter<File>) -> Result<T>,
{
    let partial = partial_path(output);
    let result = File::create(&partial)
        .map_err(Error::from)
        .and_then(|file| write(BufWriter::new(file)))
        .and_then(|value| {
            std::fs::rename(&partial, output)?;
            Ok(value)
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

fn roundtrip(config: &Config, data: &[u8]) -> Result<bool> {
    let options = &config.options;

    let mut compress_metrics = Metrics::new(Operation::Compress);
    let packed = if options.workers > 1 {
        container::compress_parallel(data, options)?
    } else {
        container::compress_with_progress(data, options, |p| {
            compress_metrics.record_progress(&p);
            log_progress(p)
        })?
    };
    compress_metrics.input_bytes = data.len() as u64;
    compress_metrics.output_bytes = packed.len() as u64;
    compress_metrics.complete();

    let mut decompress_metrics = Metrics::new(Operation::Decompress);
    let restored = if options.workers > 1 {
        container::decompress_parallel(&packed, options)?
    } else {
        container::decompress_with_progress(&packed, options, log_progress)?
    };
    decompress_metrics.record_frames(&container::frame_summaries(&packed)?);
    decompress_metrics.input_bytes = packed.len() as u64;
    decompress_metrics.output_bytes = restored.len() as u64;
    decompress_metrics.complete();

    report(config, &compress_metrics);
    report(config, &decompress_metrics);

    let verified = restored == data;
    if verified {
        println!("✓ Roundtrip verified");
        println!(
            "  {} bytes -> {} bytes in {} chunks",
            data.len(),
            packed.len(),
            decompress_metrics.chunks
        );
    } else {
        println!(
            "✗ Roundtrip failed: restored {} bytes, expected {}",
            restored.len(),
            data.len()
        );
    }
    Ok(verified)
}

fn log_progress(progress: Progress) -> ControlFlow<()> {
    match progress.fraction() {
        Some(fraction) => tracing::info!(
            chunks = progress.chunks_done,
            bytes = progress.bytes_done,
            percent = (fraction * 100.0).round() as u64,
            "progress"
        ),
        None => tracing::info!(chunks = progress.chunks_done, bytes = progress.bytes_done, "progress"),
    }
    ControlFlow::Continue(())
}

fn report(config: &Config, metrics: &Metrics) {
    if config.print_metrics {
        metrics.print_summary();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huffzip_core::ContainerOptions;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("huffzip-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn decompress_config(input: &Path, output: &Path, workers: usize) -> Config {
        Config {
            mode: Mode::Decompress {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
            },
            options: ContainerOptions {
                workers,
                ..ContainerOptions::with_chunk_size(10_000)
            },
            print_config: false,
            print_metrics: false,
        }
    }

    fn truncated_container(dir: &Path) -> PathBuf {
        let data = input_gen::generate_sample_data(3, 50_000);
        let mut packed = huffzip_core::compress(&data, 10_000).unwrap();
        packed.truncate(packed.len() - 5);
        let path = dir.join("broken.huff");
        std::fs::write(&path, &packed).unwrap();
        path
    }

    #[test]
    fn test_failed_decompress_leaves_no_output() {
        for workers in [1, 2] {
            let dir = scratch_dir(&format!("fail{}", workers));
            let input = truncated_container(&dir);
            let output = dir.join("broken");
            let config = decompress_config(&input, &output, workers);

            assert!(decompress_file(&config, &input, &output).is_err());
            assert!(!output.exists(), "workers {}", workers);
            assert!(!partial_path(&output).exists(), "workers {}", workers);
            std::fs::remove_dir_all(&dir).unwrap();
        }
    }

    #[test]
    fn test_failed_decompress_keeps_existing_output() {
        let dir = scratch_dir("keep");
        let input = truncated_container(&dir);
        let output = dir.join("broken");
        std::fs::write(&output, b"previous").unwrap();

        let config = decompress_config(&input, &output, 1);
        assert!(decompress_file(&config, &input, &output).is_err());
        assert_eq!(std::fs::read(&output).unwrap(), b"previous");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_round_trip() {
        let dir = scratch_dir("ok");
        let original = dir.join("data.bin");
        let data = input_gen::generate_sample_data(8, 30_000);
        std::fs::write(&original, &data).unwrap();

        let packed = dir.join("data.bin.huff");
        let restored = dir.join("restored.bin");
        let config = decompress_config(&packed, &restored, 1);

        compress_file(&config, &original, &packed).unwrap();
        decompress_file(&config, &packed, &restored).unwrap();
        assert_eq!(std::fs::read(&restored).unwrap(), data);
        assert!(!partial_path(&restored).exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
