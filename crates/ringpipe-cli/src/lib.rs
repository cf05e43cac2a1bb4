//! Command-line front-end for [`ringpipe`].
//!
//! Opens the input and output, runs the pipeline, and leaves exit codes to
//! the binary. `-` stands for stdin / stdout.

use anyhow::{Context, Result};
use clap::Parser;
use ringpipe::{Config, Pipeline, PipelineReport, DEFAULT_CHUNK_SIZE};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const STDIO: &str = "-";

/// Copy INPUT to OUTPUT through a bounded ring buffer.
#[derive(Debug, Parser)]
#[command(name = "ringpipe", version, about)]
pub struct Cli {
    /// File to read, or `-` for stdin
    pub input: PathBuf,

    /// File to create or truncate, or `-` for stdout
    pub output: PathBuf,

    /// Ring buffer capacity in bytes
    #[arg(short, long)]
    pub capacity: usize,

    /// Bytes per read and per write
    #[arg(short = 'n', long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

impl Cli {
    /// Pipeline configuration described by the arguments.
    pub fn config(&self) -> Config {
        Config::new(self.capacity).with_chunk_size(self.chunk_size)
    }
}

/// Installs the stderr `tracing` subscriber (`RUST_LOG`, default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// Validates the configuration, opens both ends and runs the pipeline.
///
/// The configuration is rejected before any file is touched; the input is
/// opened before the output so a missing input never truncates the output.
pub fn run(cli: &Cli) -> Result<PipelineReport> {
    let pipeline = Pipeline::new(cli.config())?;

    let source = open_input(&cli.input)
        .with_context(|| format!("could not open input file: {}", cli.input.display()))?;
    let sink = open_output(&cli.output)
        .with_context(|| format!("could not open output file: {}", cli.output.display()))?;
    debug!(input = %cli.input.display(), output = %cli.output.display(), "files opened");

    let report = pipeline.run(source, sink).with_context(|| {
        format!(
            "copying {} to {} failed",
            cli.input.display(),
            cli.output.display()
        )
    })?;

    info!(
        bytes = report.bytes_written(),
        reads = report.producer.reads,
        writes = report.consumer.writes,
        peak_occupancy = report.buffer.peak_len,
        capacity = cli.capacity,
        "copy complete"
    );
    Ok(report)
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}

fn open_input(path: &Path) -> io::Result<Box<dyn Read + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin()));
    }
    Ok(Box::new(File::open(path)?))
}

fn open_output(path: &Path) -> io::Result<BufWriter<Box<dyn Write + Send>>> {
    let sink: Box<dyn Write + Send> = if is_stdio(path) {
        Box::new(io::stdout())
    } else {
        Box::new(File::create(path)?)
    };
    Ok(BufWriter::new(sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["ringpipe", "in.txt", "out.txt", "--capacity", "1024"])
            .unwrap();
        assert_eq!(cli.input, PathBuf::from("in.txt"));
        assert_eq!(cli.config(), Config::new(1024));
    }

    #[test]
    fn test_parse_chunk_size() {
        let cli = Cli::try_parse_from(["ringpipe", "-", "-", "-c", "8", "-n", "100"]).unwrap();
        assert!(is_stdio(&cli.input));
        assert!(is_stdio(&cli.output));
        assert_eq!(cli.config(), Config::new(8).with_chunk_size(100));
    }

    #[test]
    fn test_capacity_required() {
        assert!(Cli::try_parse_from(["ringpipe", "in", "out"]).is_err());
    }
}
