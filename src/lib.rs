//! # Organization Configuration Library
//!
//! This library provides the core functionality behind the `org-config`
//! command-line tool, which keeps formatting, documentation and issue-label
//! configuration consistent across an organization's repositories.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::Path;
//! use org_config::formatter::{self, Formatter, Mode};
//! use org_config::tool::SystemRunner;
//!
//! let root = Path::new(".");
//! let config = Formatter::ClangFormat
//!     .config_search(None, root, Path::new("/opt/org-config/shared"))
//!     .resolve()?;
//! let files = Formatter::ClangFormat.collect_files(root, &[])?;
//! let outcome = formatter::run(Formatter::ClangFormat, &config, Mode::Check, root, &files, &SystemRunner)?;
//! println!("exit code {}", outcome.exit_code);
//! # Ok::<(), org_config::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Config resolution (`resolver`)**: picks the configuration file for a
//!   tool from an explicit path, local overrides or shared defaults, and
//!   manages the temporary copy some tools need.
//! - **Formatter wrappers (`formatter`)**: run clang-format or fprettify in
//!   apply or check mode over the qualifying files of a repository.
//! - **Change propagation (`propagate`)**: rolls a shared file out to many
//!   repositories through clone, branch, commit, push and pull request
//!   stages, with a per-repository report.
//! - **Label synchronization (`labels`)**: lists the organization's active
//!   repositories and runs `github-label-sync` on each.
//! - **INI combining (`combine`)**: merges a repository config over the
//!   organization default.
//!
//! External programs are reached through the [`tool::ToolRunner`] trait, so
//! all of the above can be exercised without the real tools installed.

pub mod combine;
pub mod defaults;
pub mod error;
pub mod exit_codes;
pub mod formatter;
pub mod git;
pub mod github;
pub mod labels;
pub mod output;
pub mod propagate;
pub mod resolver;
pub mod settings;
pub mod tool;

#[cfg(test)]
mod resolver_proptest;
