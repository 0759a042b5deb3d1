//! chatqueue - Live chat queue with round-robin agent assignment.
//!
//! Each invocation loads the queue snapshot, applies one command and exits.

use clap::Parser;
use std::process::ExitCode;

use chatqueue::{logging, Commands};

fn main() -> ExitCode {
    // Usage errors exit 1; --help and --version exit 0.
    let args = match Commands::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Held until exit so buffered log lines reach the file.
    let _guard = logging::init();

    match args.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
