//! Git operations used by the propagator and the formatter wrappers.
//!
//! These shell out to the system `git` command, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::path::Path;

use crate::error::{Error, Result};
use crate::tool::{ToolOutput, ToolRunner};

/// Run `git <args>` in `repo`, failing on a non-zero status.
fn git(runner: &dyn ToolRunner, repo: &Path, args: &[&str]) -> Result<ToolOutput> {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let output = runner.run("git", &args, repo)?;
    if !output.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            repo: repo.display().to_string(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// Clone `url` into `target_dir`.
///
/// The parent of `target_dir` is used as the working directory and must
/// exist; `target_dir` itself must not.
pub fn clone(runner: &dyn ToolRunner, url: &str, target_dir: &Path) -> Result<()> {
    let parent = match target_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = target_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::GitCommand {
            command: format!("clone {}", url),
            repo: target_dir.display().to_string(),
            stderr: "target directory has no name".to_string(),
        })?;
    let args = vec!["clone".to_string(), url.to_string(), name];
    let output = runner.run("git", &args, parent)?;

    if !output.success() {
        let stderr = output.stderr.trim();

        // Provide helpful error message for common auth failures
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                - Personal access token set up\n\
                Error: {}",
                stderr
            )
        } else {
            stderr.to_string()
        };

        return Err(Error::GitCommand {
            command: format!("clone {}", url),
            repo: target_dir.display().to_string(),
            stderr: message,
        });
    }

    Ok(())
}

/// Create and check out a new branch.
pub fn create_branch(runner: &dyn ToolRunner, repo: &Path, branch: &str) -> Result<()> {
    git(runner, repo, &["checkout", "-b", branch]).map(|_| ())
}

/// Stage `paths` and commit them with `message`.
pub fn commit_paths(
    runner: &dyn ToolRunner,
    repo: &Path,
    paths: &[&Path],
    message: &str,
) -> Result<()> {
    let mut add = vec!["add".to_string(), "--".to_string()];
    add.extend(paths.iter().map(|p| p.display().to_string()));
    let add: Vec<&str> = add.iter().map(String::as_str).collect();
    git(runner, repo, &add)?;
    git(runner, repo, &["commit", "-m", message]).map(|_| ())
}

/// Push `branch` to `origin` and set it as upstream.
pub fn push(runner: &dyn ToolRunner, repo: &Path, branch: &str) -> Result<()> {
    git(runner, repo, &["push", "--set-upstream", "origin", branch]).map(|_| ())
}

/// Whether `dir` is inside a git work tree.
pub fn is_work_tree(runner: &dyn ToolRunner, dir: &Path) -> bool {
    git(runner, dir, &["rev-parse", "--is-inside-work-tree"])
        .map(|out| out.stdout.trim() == "true")
        .unwrap_or(false)
}

/// Whether `file` differs from its last committed state.
pub fn has_changes(runner: &dyn ToolRunner, repo: &Path, file: &Path) -> Result<bool> {
    let args = vec![
        "diff".to_string(),
        "--quiet".to_string(),
        "--".to_string(),
        file.display().to_string(),
    ];
    let output = runner.run("git", &args, repo)?;
    match output.code {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::GitCommand {
            command: args.join(" "),
            repo: repo.display().to_string(),
            stderr: output.stderr.trim().to_string(),
        }),
    }
}
