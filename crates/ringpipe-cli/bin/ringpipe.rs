//! Copy a file through a bounded ring buffer.
//!
//! Run with: `cargo run -p ringpipe-cli -- input.txt output.txt --capacity 1024`

use clap::Parser;
use ringpipe_cli::{init_tracing, run, Cli};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
