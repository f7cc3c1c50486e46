use std::process::ExitCode;

use batchrun::{Cli, Output};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new(false, quiet).critical(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
