//! # sci-tools entry point
//!
//! ```bash
//! sci-tools jt-test data.csv --group-col "Sample Type" --order "A,B,C,D"
//! sci-tools version
//! ```
//!
//! Exit status is 0 on success and on benign early exits (nothing to test),
//! 1 on any fatal error.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::Parser as _;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if let Err(e) = sci_tools::logging::init(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    match cli::run_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
