//! # Formatter Commands
//!
//! Implements the `clang-format` and `fprettify` subcommands. Both resolve a
//! single configuration file (explicit `--config`, then the repository's own
//! override, then the shared organization default), collect qualifying
//! files and run the formatter once over all of them.
//!
//! - Without flags the files are rewritten in place.
//! - With `-d/--dry-run` the formatter only verifies, and its exit code is
//!   returned: non-zero means some files need formatting.
//! - When no configuration exists anywhere the command exits with status 2
//!   without running the formatter.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use org_config::formatter::{self, Formatter, Mode};
use org_config::output::Status;
use org_config::tool::SystemRunner;

use crate::cli::{self, Context};

/// Arguments shared by the formatter wrappers
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Check formatting without modifying files
    #[arg(short, long)]
    pub dry_run: bool,

    /// Explicit configuration file, checked before local and shared ones
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the shared organization configs
    #[arg(long, value_name = "DIR", env = "ORG_CONFIG_SHARED_DIR")]
    pub shared_dir: Option<PathBuf>,

    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Files or directories to format, relative to the root (defaults to everything)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Execute a formatter command.
pub fn execute(formatter: Formatter, args: FormatArgs, ctx: &Context) -> Result<ExitCode> {
    let out = &ctx.output;
    let root = match args.root {
        Some(root) => std::path::absolute(root)?,
        None => std::env::current_dir()?,
    };
    let shared_dir = ctx.settings.shared_dir(args.shared_dir.as_deref());

    let config = formatter
        .config_search(args.config, &root, &shared_dir)
        .resolve()?;
    println!(
        "{} {}: using {} config {}",
        out.marker(Status::Search),
        formatter,
        config.source,
        config.path.display()
    );

    let files = formatter.collect_files(&root, &args.paths)?;
    if files.is_empty() {
        println!(
            "{} No files for {} under {}",
            out.marker(Status::Info),
            formatter,
            root.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let mode = if args.dry_run { Mode::Check } else { Mode::Apply };
    let outcome = formatter::run(formatter, &config, mode, &root, &files, &SystemRunner)?;

    match (mode, outcome.exit_code) {
        (Mode::Check, 0) => println!(
            "{} {} files are formatted correctly",
            out.marker(Status::Ok),
            outcome.files
        ),
        (Mode::Check, code) => println!(
            "{} {} reported files needing formatting (exit code {})",
            out.marker(Status::Fail),
            formatter,
            code
        ),
        (Mode::Apply, 0) => {
            println!(
                "{} Formatted {} files",
                out.marker(Status::Ok),
                outcome.files
            );
            for file in &outcome.changed {
                println!("   changed: {}", file.display());
            }
        }
        (Mode::Apply, code) => println!(
            "{} {} failed (exit code {})",
            out.marker(Status::Fail),
            formatter,
            code
        ),
    }

    Ok(cli::exit_code(outcome.exit_code))
}
