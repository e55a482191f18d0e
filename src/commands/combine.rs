//! # Combine-Config Command Implementation
//!
//! Merges a repository-specific INI file over the organization default and
//! writes the result. Keys from the repository file win; a missing
//! repository file leaves the default unchanged.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use org_config::combine;

/// Merge two INI-style configuration files
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Organization default config
    #[arg(value_name = "DEFAULT")]
    pub default: PathBuf,

    /// Repository-specific config (may be missing)
    #[arg(value_name = "REPO")]
    pub repo: PathBuf,

    /// Output path for the merged config
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Execute the `combine-config` command.
pub fn execute(args: CombineArgs) -> Result<ExitCode> {
    combine::combine_files(&args.default, &args.repo, &args.output).with_context(|| {
        format!(
            "Failed to combine {} and {}",
            args.default.display(),
            args.repo.display()
        )
    })?;
    println!("Wrote {}", args.output.display());
    Ok(ExitCode::SUCCESS)
}
