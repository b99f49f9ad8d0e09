//! Atlasq - command-line tool for querying texture atlas metadata

use std::process::ExitCode;

use atlasq::cli;

fn main() -> ExitCode {
    cli::run()
}
