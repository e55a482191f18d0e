//! # Labels Command Implementation
//!
//! Subcommands for keeping issue labels consistent across the organization:
//!
//! - `labels sync`: run `github-label-sync` over every active repository.
//!   Dry run unless `--apply` is given. Requires `GITHUB_TOKEN`.
//! - `labels filter-repos`: turn a saved GraphQL dump of the organization's
//!   repositories into a `repos.txt` list.
//! - `labels validate`: check the label specification file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use org_config::defaults::{LABELS_FILENAME, REPO_LIST_FILENAME};
use org_config::labels;
use org_config::output::Status;
use org_config::propagate::read_repo_list;
use org_config::tool::SystemRunner;

use crate::cli::Context;

#[derive(Subcommand, Debug)]
pub enum LabelsCommand {
    /// Apply the label specification to every active repository
    Sync(SyncArgs),

    /// Write the list of managed repositories from a GraphQL dump
    FilterRepos(FilterReposArgs),

    /// Check the label specification file
    Validate(ValidateArgs),
}

/// Arguments for `labels sync`
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Label specification file
    #[arg(long, value_name = "FILE", default_value = LABELS_FILENAME)]
    pub labels: PathBuf,

    /// Only sync repositories whose `owner/name` matches this glob
    #[arg(long, value_name = "GLOB")]
    pub filter: Option<String>,

    /// Use this repository list instead of querying GitHub
    #[arg(short = 'l', long, value_name = "FILE")]
    pub repo_list: Option<PathBuf>,

    /// Organization to sync
    #[arg(long, value_name = "ORG", env = "ORG_CONFIG_ORG")]
    pub org: Option<String>,

    /// Actually change labels (default is a dry run)
    #[arg(long)]
    pub apply: bool,
}

/// Arguments for `labels filter-repos`
#[derive(Args, Debug)]
pub struct FilterReposArgs {
    /// GraphQL JSON output listing the organization's repositories
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the repository list
    #[arg(value_name = "OUTPUT", default_value = REPO_LIST_FILENAME)]
    pub output: PathBuf,

    /// Organization whose `.github` repository is always listed
    #[arg(long, value_name = "ORG", env = "ORG_CONFIG_ORG")]
    pub org: Option<String>,
}

/// Arguments for `labels validate`
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Label specification file
    #[arg(long, value_name = "FILE", default_value = LABELS_FILENAME)]
    pub labels: PathBuf,
}

/// Execute a `labels` subcommand.
pub fn execute(cmd: LabelsCommand, ctx: &Context) -> Result<ExitCode> {
    match cmd {
        LabelsCommand::Sync(args) => sync(args, ctx),
        LabelsCommand::FilterRepos(args) => filter_repos(args, ctx),
        LabelsCommand::Validate(args) => validate(args, ctx),
    }
}

fn sync(args: SyncArgs, ctx: &Context) -> Result<ExitCode> {
    let out = &ctx.output;
    let token = labels::require_token()?;
    let defined = labels::load_labels(&args.labels)?;
    let org = args.org.unwrap_or_else(|| ctx.settings.org.clone());
    let cwd = std::env::current_dir()?;

    let repos = match &args.repo_list {
        Some(list) => labels::qualify_names(&org, read_repo_list(list)?),
        None => {
            println!("{} Listing repositories of {}", out.marker(Status::Search), org);
            labels::list_managed_repositories(&SystemRunner, &cwd, &org)?
        }
    };
    let repos = labels::apply_repo_filter(repos, args.filter.as_deref())?;

    if repos.is_empty() {
        println!("{} No repositories to sync", out.marker(Status::Info));
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} Syncing {} labels to {} repositories{}",
        out.marker(Status::Info),
        defined.len(),
        repos.len(),
        if args.apply { "" } else { " (dry run)" }
    );
    let attempted =
        labels::sync_labels(&SystemRunner, &cwd, &repos, &args.labels, &token, args.apply);
    println!("{} Processed {} repositories", out.marker(Status::Ok), attempted);

    Ok(ExitCode::SUCCESS)
}

fn filter_repos(args: FilterReposArgs, ctx: &Context) -> Result<ExitCode> {
    let org = args.org.unwrap_or_else(|| ctx.settings.org.clone());
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let repos = labels::parse_repository_pages(&raw)?;
    let names = labels::filter_repositories(&org, &repos);
    labels::write_repo_list(&args.output, &names)?;

    println!(
        "{} Wrote {} of {} repositories to {}",
        ctx.output.marker(Status::Ok),
        names.len(),
        repos.len(),
        args.output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn validate(args: ValidateArgs, ctx: &Context) -> Result<ExitCode> {
    let defined = labels::load_labels(&args.labels)?;
    println!(
        "{} {} defines {} valid labels",
        ctx.output.marker(Status::Ok),
        args.labels.display(),
        defined.len()
    );
    Ok(ExitCode::SUCCESS)
}
