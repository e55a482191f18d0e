//! # Change Propagation
//!
//! Rolls a shared artifact (for example the organization's
//! `.readthedocs.yaml`) out to a list of repositories. Each target is
//! processed on its own, strictly one after another:
//!
//! 1. **Clone** into `<work_dir>/<owner>/<name>`
//! 2. **Branch**: create a fresh branch
//! 3. **Overlay**: copy the artifact into place (always, once cloned)
//! 4. **Commit** when the work level is at least 1
//! 5. **Push** when the work level is at least 2
//! 6. **Pull request** when the work level is 3; its link is recorded
//!
//! A failing stage marks the target [`TargetStatus::Failed`] and the driver
//! moves on to the next target. Nothing is retried or rolled back. The
//! outcome of every target is collected in a [`RunReport`].
//!
//! Git and GitHub access go through the [`RepoOperations`] trait so the
//! state progression can be tested without a network.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{Error, Result};
use crate::git;
use crate::github;
use crate::tool::ToolRunner;

/// How far the propagator advances through the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkLevel {
    /// Clone, branch and overlay only
    Overlay = 0,
    /// Also commit
    Commit = 1,
    /// Also push
    Push = 2,
    /// Also open a pull request
    PullRequest = 3,
}

impl TryFrom<u8> for WorkLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WorkLevel::Overlay),
            1 => Ok(WorkLevel::Commit),
            2 => Ok(WorkLevel::Push),
            3 => Ok(WorkLevel::PullRequest),
            other => Err(Error::precondition(format!(
                "work level must be between 0 and 3, got {}",
                other
            ))),
        }
    }
}

/// Progress of a single target. Variants are ordered; a target only ever
/// moves forward, and `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetStatus {
    Pending,
    Cloned,
    Updated,
    Committed,
    Pushed,
    PullRequestOpened,
    Failed,
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetStatus::Pending => "pending",
            TargetStatus::Cloned => "cloned",
            TargetStatus::Updated => "updated",
            TargetStatus::Committed => "committed",
            TargetStatus::Pushed => "pushed",
            TargetStatus::PullRequestOpened => "pull request opened",
            TargetStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Stage at which a target failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clone,
    Branch,
    Overlay,
    Commit,
    Push,
    PullRequest,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Clone => "clone",
            Stage::Branch => "branch",
            Stage::Overlay => "overlay",
            Stage::Commit => "commit",
            Stage::Push => "push",
            Stage::PullRequest => "pull request",
        };
        f.write_str(name)
    }
}

/// Why a target failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: Stage,
    pub detail: String,
}

/// One repository the artifact is rolled out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    /// Name as given by the operator (`repo` or `owner/repo`)
    pub name: String,
    /// URL the repository is cloned from
    pub clone_url: String,
    /// Checkout location
    pub local_path: PathBuf,
    status: TargetStatus,
    failure: Option<StageFailure>,
    review_url: Option<String>,
}

impl RepositoryTarget {
    /// Build a pending target for `name` owned by `org` by default.
    pub fn new(org: &str, name: &str, work_dir: &Path) -> Result<Self> {
        let clone_url = github::clone_url(org, name)?;
        let full = github::full_name(org, name);
        let local_path = full
            .split('/')
            .fold(work_dir.to_path_buf(), |path, part| path.join(part));
        Ok(Self {
            name: name.to_string(),
            clone_url: clone_url.to_string(),
            local_path,
            status: TargetStatus::Pending,
            failure: None,
            review_url: None,
        })
    }

    pub fn status(&self) -> TargetStatus {
        self.status
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        self.failure.as_ref()
    }

    pub fn review_url(&self) -> Option<&str> {
        self.review_url.as_deref()
    }

    fn advance(&mut self, next: TargetStatus) {
        debug_assert!(
            self.status != TargetStatus::Failed && next > self.status,
            "status of {} cannot move from {:?} to {:?}",
            self.name,
            self.status,
            next
        );
        self.status = next;
    }

    fn fail(&mut self, stage: Stage, error: &Error) {
        warn!("{}: {} failed: {}", self.name, stage, error);
        self.status = TargetStatus::Failed;
        self.failure = Some(StageFailure {
            stage,
            detail: error.to_string(),
        });
    }
}

/// Trait for the git/GitHub actions of the propagator - allows mocking in tests
pub trait RepoOperations {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
    fn create_branch(&self, repo: &Path, branch: &str) -> Result<()>;
    fn commit(&self, repo: &Path, file: &Path, message: &str) -> Result<()>;
    fn push(&self, repo: &Path, branch: &str) -> Result<()>;
    /// Open a pull request and return its URL.
    fn open_pull_request(&self, repo: &Path, branch: &str, title: &str, body: &str)
        -> Result<String>;
}

/// [`RepoOperations`] backed by the `git` and `gh` command-line tools.
#[derive(Debug, Clone, Default)]
pub struct CliRepoOperations<R: ToolRunner> {
    runner: R,
}

impl<R: ToolRunner> CliRepoOperations<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: ToolRunner> RepoOperations for CliRepoOperations<R> {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        git::clone(&self.runner, url, dest)
    }

    fn create_branch(&self, repo: &Path, branch: &str) -> Result<()> {
        git::create_branch(&self.runner, repo, branch)
    }

    fn commit(&self, repo: &Path, file: &Path, message: &str) -> Result<()> {
        git::commit_paths(&self.runner, repo, &[file], message)
    }

    fn push(&self, repo: &Path, branch: &str) -> Result<()> {
        git::push(&self.runner, repo, branch)
    }

    fn open_pull_request(
        &self,
        repo: &Path,
        branch: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        github::open_pull_request(&self.runner, repo, branch, title, body)
    }
}

/// What to roll out and how far to go.
#[derive(Debug, Clone)]
pub struct PropagateOptions {
    /// File copied into every target
    pub artifact: PathBuf,
    /// Location of the artifact inside each target, relative to its root
    pub destination: PathBuf,
    pub work_level: WorkLevel,
    pub branch: String,
    pub commit_message: String,
    pub pr_title: String,
    pub pr_body: String,
}

/// Runs the per-target stages for a batch of repositories.
pub struct Propagator<'a> {
    ops: &'a dyn RepoOperations,
    options: PropagateOptions,
}

impl<'a> Propagator<'a> {
    pub fn new(ops: &'a dyn RepoOperations, options: PropagateOptions) -> Self {
        Self { ops, options }
    }

    /// Process every target in order and report their final states.
    pub fn propagate(&self, targets: Vec<RepositoryTarget>) -> RunReport {
        let mut processed = Vec::with_capacity(targets.len());
        for mut target in targets {
            info!("Processing {}", target.name);
            self.process(&mut target);
            processed.push(target);
        }
        RunReport::from_targets(&processed)
    }

    fn process(&self, target: &mut RepositoryTarget) {
        let opts = &self.options;
        let repo = target.local_path.clone();

        let cloned = repo
            .parent()
            .map_or(Ok(()), |parent| fs::create_dir_all(parent).map_err(Error::from))
            .and_then(|_| self.ops.clone_repo(&target.clone_url, &repo));
        if let Err(e) = cloned {
            return target.fail(Stage::Clone, &e);
        }
        target.advance(TargetStatus::Cloned);

        if let Err(e) = self.ops.create_branch(&repo, &opts.branch) {
            return target.fail(Stage::Branch, &e);
        }

        if let Err(e) = overlay(&opts.artifact, &repo.join(&opts.destination)) {
            return target.fail(Stage::Overlay, &e);
        }
        target.advance(TargetStatus::Updated);

        if opts.work_level < WorkLevel::Commit {
            return;
        }
        if let Err(e) = self.ops.commit(&repo, &opts.destination, &opts.commit_message) {
            return target.fail(Stage::Commit, &e);
        }
        target.advance(TargetStatus::Committed);

        if opts.work_level < WorkLevel::Push {
            return;
        }
        if let Err(e) = self.ops.push(&repo, &opts.branch) {
            return target.fail(Stage::Push, &e);
        }
        target.advance(TargetStatus::Pushed);

        if opts.work_level < WorkLevel::PullRequest {
            return;
        }
        match self
            .ops
            .open_pull_request(&repo, &opts.branch, &opts.pr_title, &opts.pr_body)
        {
            Ok(url) => {
                info!("{}: opened {}", target.name, url);
                target.review_url = Some(url);
                target.advance(TargetStatus::PullRequestOpened);
            }
            Err(e) => target.fail(Stage::PullRequest, &e),
        }
    }
}

fn overlay(artifact: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(artifact, dest)?;
    Ok(())
}

/// Refuse a work directory whose reset would delete `cwd` or `artifact`.
pub fn check_work_dir(work_dir: &Path, cwd: &Path, artifact: &Path) -> Result<()> {
    let work = resolved(work_dir)?;
    if resolved(cwd)?.starts_with(&work) {
        return Err(Error::precondition(format!(
            "work directory {} contains the current directory and would be deleted",
            work_dir.display()
        )));
    }
    if resolved(artifact)?.starts_with(&work) {
        return Err(Error::precondition(format!(
            "artifact {} lies inside work directory {} and would be deleted",
            artifact.display(),
            work_dir.display()
        )));
    }
    Ok(())
}

/// Canonical path when it exists, otherwise the absolute form.
fn resolved(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(path) => Ok(path),
        Err(_) => Ok(std::path::absolute(path)?),
    }
}

/// Empty the work directory before a batch, creating it if needed.
pub fn reset_work_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        info!("Clearing work directory {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Read a newline-delimited repository list. Blank lines and `#` comments
/// are ignored.
pub fn read_repo_list(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(Error::precondition(format!(
            "repository list {} does not exist",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Combine `--repo` and `--repo-list` into an ordered, duplicate-free list.
///
/// # Errors
///
/// A precondition failure when neither input is given, the list file is
/// missing, or the combined list is empty.
pub fn collect_target_names(repo: Option<&str>, list: Option<&Path>) -> Result<Vec<String>> {
    if repo.is_none() && list.is_none() {
        return Err(Error::precondition(
            "at least one of --repo or --repo-list is required",
        ));
    }

    let mut names = Vec::new();
    if let Some(repo) = repo {
        names.push(repo.trim().to_string());
    }
    if let Some(list) = list {
        names.extend(read_repo_list(list)?);
    }

    let mut seen = HashSet::new();
    names.retain(|name| !name.is_empty() && seen.insert(name.clone()));

    if names.is_empty() {
        return Err(Error::precondition("no repositories to process"));
    }
    Ok(names)
}

/// Final state of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub name: String,
    pub status: TargetStatus,
    /// Pull request link, or the failure detail
    pub detail: Option<String>,
    /// Stage that failed, if any
    pub failed_stage: Option<Stage>,
}

impl ReportEntry {
    /// Text for the status column: the review link when one was opened.
    pub fn outcome(&self) -> String {
        match (self.status, &self.detail, self.failed_stage) {
            (TargetStatus::PullRequestOpened, Some(url), _) => url.clone(),
            (TargetStatus::Failed, Some(detail), Some(stage)) => {
                format!("failed at {}: {}", stage, detail)
            }
            (status, _, _) => status.to_string(),
        }
    }
}

/// Outcome of a propagation batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    entries: Vec<ReportEntry>,
}

impl RunReport {
    fn from_targets(targets: &[RepositoryTarget]) -> Self {
        let entries = targets
            .iter()
            .map(|t| ReportEntry {
                name: t.name.clone(),
                status: t.status,
                detail: t
                    .review_url
                    .clone()
                    .or_else(|| t.failure.as_ref().map(|f| f.detail.clone())),
                failed_stage: t.failure.as_ref().map(|f| f.stage),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == TargetStatus::Failed)
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|e| e.name.len())
            .chain(std::iter::once("Repository".len()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:<width$}  Status", "Repository", width = width)?;
        writeln!(f, "{}  {}", "-".repeat(width), "-".repeat(6))?;
        for entry in &self.entries {
            writeln!(f, "{:<width$}  {}", entry.name, entry.outcome(), width = width)?;
        }
        Ok(())
    }
}
