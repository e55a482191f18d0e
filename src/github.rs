//! GitHub interactions through the `gh` CLI and `github-label-sync`.
//!
//! Authentication is left to the tools themselves (`gh auth login`, or the
//! token passed to `github-label-sync`).

use std::path::Path;

use url::Url;

use crate::error::{Error, Result};
use crate::tool::{ToolOutput, ToolRunner};

const GITHUB_BASE: &str = "https://github.com/";

/// GraphQL query listing an organization's repositories with archival and
/// topic metadata. `$endCursor` is filled in by `gh api --paginate`.
pub const ORG_REPOSITORIES_QUERY: &str = r#"query($org: String!, $endCursor: String) {
  organization(login: $org) {
    repositories(first: 100, after: $endCursor) {
      pageInfo { hasNextPage endCursor }
      nodes {
        nameWithOwner
        isArchived
        repositoryTopics(first: 20) { nodes { topic { name } } }
      }
    }
  }
}"#;

/// Full `owner/name` for a repository given as `name` or `owner/name`.
pub fn full_name(org: &str, name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", org, name)
    }
}

/// HTTPS clone URL derived from a repository name.
pub fn clone_url(org: &str, name: &str) -> Result<Url> {
    let full = full_name(org, name);
    if full.split('/').count() != 2 || full.split('/').any(str::is_empty) {
        return Err(Error::precondition(format!(
            "invalid repository name '{}'",
            name
        )));
    }
    Ok(Url::parse(GITHUB_BASE)?.join(&format!("{}.git", full))?)
}

fn gh(runner: &dyn ToolRunner, cwd: &Path, args: Vec<String>) -> Result<ToolOutput> {
    let output = runner.run("gh", &args, cwd)?;
    if !output.success() {
        return Err(Error::GhCommand {
            command: args.first().cloned().unwrap_or_default(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// Open a pull request from `branch` in the repository checked out at
/// `repo`, returning its URL.
pub fn open_pull_request(
    runner: &dyn ToolRunner,
    repo: &Path,
    branch: &str,
    title: &str,
    body: &str,
) -> Result<String> {
    let output = gh(
        runner,
        repo,
        vec![
            "pr".to_string(),
            "create".to_string(),
            "--head".to_string(),
            branch.to_string(),
            "--title".to_string(),
            title.to_string(),
            "--body".to_string(),
            body.to_string(),
        ],
    )?;

    // gh prints the new pull request's URL as the last line
    output
        .stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with("https://"))
        .map(str::to_string)
        .ok_or_else(|| Error::GhCommand {
            command: "pr create".to_string(),
            stderr: format!("no pull request URL in output: {}", output.stdout.trim()),
        })
}

/// Fetch every repository of `org` as raw paginated GraphQL output.
///
/// `gh api --paginate` emits one JSON document per page, concatenated.
pub fn fetch_org_repositories(runner: &dyn ToolRunner, cwd: &Path, org: &str) -> Result<String> {
    let output = gh(
        runner,
        cwd,
        vec![
            "api".to_string(),
            "graphql".to_string(),
            "--paginate".to_string(),
            "-f".to_string(),
            format!("org={}", org),
            "-f".to_string(),
            format!("query={}", ORG_REPOSITORIES_QUERY),
        ],
    )?;
    Ok(output.stdout)
}

/// Environment variable `github-label-sync` reads its access token from.
pub const LABEL_SYNC_TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";

/// Run `github-label-sync` for one repository.
///
/// The token is handed over in [`LABEL_SYNC_TOKEN_VAR`], never as an
/// argument. The tool's output is returned as-is; a non-zero exit is not an error at
/// this level.
pub fn run_label_sync(
    runner: &dyn ToolRunner,
    cwd: &Path,
    repo: &str,
    labels: &Path,
    token: &str,
    dry_run: bool,
) -> Result<ToolOutput> {
    let mut args = vec!["--labels".to_string(), labels.display().to_string()];
    if dry_run {
        args.push("--dry-run".to_string());
    }
    args.push(repo.to_string());
    runner.run_with_env(
        "github-label-sync",
        &args,
        cwd,
        &[(LABEL_SYNC_TOKEN_VAR, token)],
    )
}
