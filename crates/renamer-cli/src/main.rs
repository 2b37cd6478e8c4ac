//! CLI entrypoint for the batch rename engine.
//!
//! The binary delegates to [`renamer_cli::run`], which loads configuration,
//! parses the subcommand and renders results on the locked standard streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    renamer_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
