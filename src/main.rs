//! dimspace - Inspect content dimension spaces and their fallbacks

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = dimspace::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
