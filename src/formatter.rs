//! # Formatter Wrappers
//!
//! Runs clang-format or fprettify over a repository with exactly one resolved
//! configuration file, in either apply (in place) or check (verify) mode.
//!
//! ## Flow
//!
//! 1. The caller resolves the config with [`Formatter::config_search`].
//! 2. [`Formatter::collect_files`] enumerates qualifying files by extension.
//! 3. [`run`] materializes the config (copying a shared default next to the
//!    sources when the tool needs it), invokes the tool once over the whole
//!    file set and releases the temporary copy afterwards.
//!
//! In check mode the tool's exit code is passed through unchanged: a non-zero
//! code means files would be reformatted. In apply mode clang-format runs are
//! followed by a `git diff` of every touched file so the operator can see
//! which files actually changed.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::Result;
use crate::git;
use crate::resolver::{ConfigSource, ResolvedConfig, ToolConfig};
use crate::tool::ToolRunner;

/// Whether the formatter rewrites files or only verifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rewrite files in place
    Apply,
    /// Report files that would change, without writing
    Check,
}

/// Supported formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// C/C++ formatting with clang-format
    ClangFormat,
    /// Fortran 90 formatting with fprettify
    Fprettify,
}

const CLANG_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "c", "cc", "cpp", "cxx"];

/// Stem suffixes of automatically differentiated Fortran sources.
const DERIVATIVE_SUFFIXES: &[&str] = &["_b", "_d", "_cs", "_bd", "_cd"];

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

impl Formatter {
    /// Executable name.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Formatter::ClangFormat => "clang-format",
            Formatter::Fprettify => "fprettify",
        }
    }

    /// File name of the config as the tool expects it.
    pub fn config_file_name(&self) -> &'static str {
        match self {
            Formatter::ClangFormat => ".clang-format",
            Formatter::Fprettify => ".fprettify.rc",
        }
    }

    /// Whether a shared config must be copied next to the sources.
    ///
    /// clang-format's `--style=file` only looks in the directories of the
    /// formatted files and their parents.
    pub fn needs_local_copy(&self) -> bool {
        matches!(self, Formatter::ClangFormat)
    }

    /// Whether applied changes are reported against the last commit.
    pub fn reports_vcs_changes(&self) -> bool {
        matches!(self, Formatter::ClangFormat)
    }

    /// Candidate search for this formatter's configuration.
    pub fn config_search(
        &self,
        explicit: Option<PathBuf>,
        repo_root: &Path,
        shared_dir: &Path,
    ) -> ToolConfig {
        let local: Vec<PathBuf> = match self {
            Formatter::ClangFormat => vec![
                repo_root.join(".clang-format"),
                repo_root.join("_clang-format"),
            ],
            Formatter::Fprettify => vec![repo_root.join(".fprettify.rc")],
        };
        ToolConfig::new(self.tool_name())
            .with_explicit(explicit)
            .with_local(local)
            .with_shared([shared_dir.join(self.config_file_name())])
    }

    /// Whether `path` is a file this formatter handles.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        match self {
            Formatter::ClangFormat => CLANG_EXTENSIONS.contains(&ext),
            Formatter::Fprettify => {
                if ext != "f90" {
                    return false;
                }
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                !DERIVATIVE_SUFFIXES
                    .iter()
                    .any(|suffix| stem.ends_with(suffix))
            }
        }
    }

    /// Enumerate qualifying files.
    ///
    /// With no `paths`, `base` is walked recursively. Otherwise each entry is
    /// walked if it is a directory or taken as-is if it is a matching file.
    /// Hidden directories are skipped. Results are relative to `base` where
    /// possible and sorted.
    pub fn collect_files(&self, base: &Path, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let roots: Vec<PathBuf> = if paths.is_empty() {
            vec![base.to_path_buf()]
        } else {
            paths.iter().map(|p| base.join(p)).collect()
        };

        let mut files = Vec::new();
        for root in roots {
            let walker = WalkDir::new(&root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));
            for entry in walker {
                let entry = entry.map_err(|e| {
                    e.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop")
                    })
                })?;
                if entry.file_type().is_file() && self.matches(entry.path()) {
                    let relative = entry
                        .path()
                        .strip_prefix(base)
                        .unwrap_or(entry.path())
                        .to_path_buf();
                    files.push(relative);
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn args(
        &self,
        mode: Mode,
        config: &Path,
        explicit_style: bool,
        files: &[PathBuf],
    ) -> Vec<String> {
        let mut args: Vec<String> = match (self, mode) {
            (Formatter::ClangFormat, _) => {
                let style = if explicit_style {
                    format!("--style=file:{}", config.display())
                } else {
                    "--style=file".to_string()
                };
                match mode {
                    Mode::Apply => vec!["-i".to_string(), style],
                    Mode::Check => vec!["--dry-run".to_string(), "--Werror".to_string(), style],
                }
            }
            (Formatter::Fprettify, Mode::Apply) => {
                vec!["-c".to_string(), config.display().to_string()]
            }
            (Formatter::Fprettify, Mode::Check) => vec![
                "-c".to_string(),
                config.display().to_string(),
                "--diff".to_string(),
            ],
        };
        args.extend(files.iter().map(|f| f.display().to_string()));
        args
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Result of one formatter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOutcome {
    /// Exit code to report; the tool's own code in check mode
    pub exit_code: i32,
    /// Number of files handed to the tool
    pub files: usize,
    /// Files that differ from their last commit after an apply run
    pub changed: Vec<PathBuf>,
}

/// Run `formatter` over `files` (relative to `root`) using `config`.
///
/// The tool runs with `root` as its working directory and receives the
/// config as an absolute path.
///
/// An empty file set returns immediately with exit code 0: the tool is not
/// invoked and no temporary config copy is created.
pub fn run(
    formatter: Formatter,
    config: &ResolvedConfig,
    mode: Mode,
    root: &Path,
    files: &[PathBuf],
    runner: &dyn ToolRunner,
) -> Result<FormatOutcome> {
    if files.is_empty() {
        info!("{}: no qualifying files under {}", formatter, root.display());
        return Ok(FormatOutcome::default());
    }

    // relative paths would resolve against the tool's cwd, not ours
    let root = &std::path::absolute(root)?;
    let output = {
        let handle = config.materialize(
            root,
            formatter.config_file_name(),
            formatter.needs_local_copy(),
        )?;
        let explicit_style = !handle.is_shared_copy() && config.source != ConfigSource::Local;
        let config_path = std::path::absolute(handle.path())?;
        let args = formatter.args(mode, &config_path, explicit_style, files);
        debug!("{}: {} files, mode {:?}", formatter, files.len(), mode);
        runner.run(formatter.tool_name(), &args, root)?
    };
    output.echo();

    let mut exit_code = output.code;
    if formatter == Formatter::Fprettify && mode == Mode::Check && exit_code == 0 {
        // fprettify --diff exits 0 even when it prints a diff
        if !output.stdout.trim().is_empty() {
            exit_code = 1;
        }
    }

    let mut changed = Vec::new();
    if mode == Mode::Apply
        && exit_code == 0
        && formatter.reports_vcs_changes()
        && git::is_work_tree(runner, root)
    {
        for file in files {
            if git::has_changes(runner, root, file)? {
                changed.push(file.clone());
            }
        }
    }

    Ok(FormatOutcome {
        exit_code,
        files: files.len(),
        changed,
    })
}
