//! # Organization Configuration CLI
//!
//! This is the binary entry point for the `org-config` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating errors into a console message and the documented exit code
//!   (see [`org_config::exit_codes`]).
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use org_config::error::Error;
use org_config::exit_codes;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<Error>()
                .map_or(exit_codes::ERROR, Error::exit_code);
            cli::exit_code(code)
        }
    }
}
