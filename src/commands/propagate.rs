//! # Propagate Command Implementation
//!
//! This module implements the `propagate` subcommand, which copies a shared
//! artifact (by default the organization's `.readthedocs.yaml`) into a list
//! of repositories and, depending on the work level, commits, pushes and
//! opens pull requests.
//!
//! ## Functionality
//!
//! - **Targets**: `-r/--repo NAME` and/or `-l/--repo-list FILE`; at least
//!   one is required.
//! - **Work level** (`-w`): 0 overlays only, 1 also commits, 2 also pushes,
//!   3 also opens a pull request.
//! - **Interactive Confirmation**: the target list is shown and must be
//!   confirmed before anything happens. `--yes` skips the prompt.
//! - **Report**: a table of repository to final status (or pull request
//!   link) is printed at the end. Per-repository failures do not change the
//!   exit code.
//!
//! Precondition failures (no targets, missing list or artifact, declined
//! confirmation, a work directory that holds the current directory or the
//! artifact) exit with status 9.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use org_config::defaults::DOCS_CONFIG_FILENAME;
use org_config::error::Error;
use org_config::output::Status;
use org_config::propagate::{
    self, CliRepoOperations, PropagateOptions, Propagator, RepositoryTarget, WorkLevel,
};
use org_config::tool::SystemRunner;

use crate::cli::Context;

/// Roll a shared file out to a list of repositories
#[derive(Args, Debug)]
pub struct PropagateArgs {
    /// How far to go: 0 overlay, 1 commit, 2 push, 3 open pull request
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=3)
    )]
    pub work_level: u8,

    /// A single repository name (`repo` or `owner/repo`)
    #[arg(short, long, value_name = "NAME")]
    pub repo: Option<String>,

    /// File listing repository names, one per line
    #[arg(short = 'l', long, value_name = "FILE")]
    pub repo_list: Option<PathBuf>,

    /// File to copy into each repository
    #[arg(short, long, value_name = "FILE", default_value = DOCS_CONFIG_FILENAME)]
    pub artifact: PathBuf,

    /// Destination inside each repository (defaults to the artifact's file name)
    #[arg(long, value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Organization owning repositories given without an owner
    #[arg(long, value_name = "ORG", env = "ORG_CONFIG_ORG")]
    pub org: Option<String>,

    /// Directory to clone into; cleared at the start of every run
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `propagate` command.
pub fn execute(args: PropagateArgs, ctx: &Context) -> Result<ExitCode> {
    let out = &ctx.output;
    let settings = &ctx.settings.propagate;

    let names =
        propagate::collect_target_names(args.repo.as_deref(), args.repo_list.as_deref())?;

    if !args.artifact.is_file() {
        return Err(Error::precondition(format!(
            "artifact {} does not exist",
            args.artifact.display()
        ))
        .into());
    }
    let destination = match args.destination.or_else(|| settings.destination.clone()) {
        Some(dest) => dest,
        None => args
            .artifact
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| Error::precondition("artifact has no file name"))?,
    };

    let org = args.org.unwrap_or_else(|| ctx.settings.org.clone());
    let work_dir = args.work_dir.unwrap_or_else(|| settings.work_dir.clone());
    let work_level = WorkLevel::try_from(args.work_level)?;
    propagate::check_work_dir(&work_dir, &std::env::current_dir()?, &args.artifact)?;

    let targets = names
        .iter()
        .map(|name| RepositoryTarget::new(&org, name, &work_dir))
        .collect::<org_config::error::Result<Vec<_>>>()?;

    println!(
        "Copying {} to {} in {} repositories (work level {}):",
        args.artifact.display(),
        destination.display(),
        targets.len(),
        args.work_level
    );
    for target in &targets {
        println!("   {}", target.name);
    }
    println!("Work directory {} will be cleared first.", work_dir.display());

    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Continue?")
            .default(false)
            .interact()
            .map_err(|e| {
                Error::precondition(format!(
                    "confirmation required ({}); pass --yes to skip the prompt",
                    e
                ))
            })?;
        if !proceed {
            return Err(Error::precondition("aborted by user").into());
        }
    }

    propagate::reset_work_dir(&work_dir)?;

    let ops = CliRepoOperations::new(SystemRunner);
    let options = PropagateOptions {
        artifact: args.artifact,
        destination,
        work_level,
        branch: settings.branch.clone(),
        commit_message: settings.commit_message.clone(),
        pr_title: settings.pr_title.clone(),
        pr_body: settings.pr_body.clone(),
    };
    let report = Propagator::new(&ops, options).propagate(targets);

    println!();
    print!("{}", report);
    println!();
    if report.failed() == 0 {
        println!("{} All repositories processed", out.marker(Status::Ok));
    } else {
        println!(
            "{} {} of {} repositories failed",
            out.marker(Status::Warn),
            report.failed(),
            report.entries().len()
        );
    }

    Ok(ExitCode::SUCCESS)
}
