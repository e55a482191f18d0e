//! Default values for org-config.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Optional settings file looked up in the current directory.
pub const SETTINGS_FILENAME: &str = "org-config.yaml";

/// Label specification shared by every repository in the organization.
pub const LABELS_FILENAME: &str = "labels.yml";

/// Newline-delimited list of repository names.
pub const REPO_LIST_FILENAME: &str = "repos.txt";

/// Documentation build configuration rolled out by the propagator.
pub const DOCS_CONFIG_FILENAME: &str = ".readthedocs.yaml";

/// Organization that owns the managed repositories.
pub const DEFAULT_ORG: &str = "scritical";

/// Branch created in each target repository by the propagator.
pub const DEFAULT_BRANCH: &str = "update-shared-config";

/// Directory where the propagator clones target repositories.
pub const DEFAULT_WORK_DIR: &str = "propagate-work";

/// Returns the default directory holding the shared configuration files.
///
/// Uses the platform configuration directory:
/// - Linux: `~/.config/org-config/shared`
/// - macOS: `~/Library/Application Support/org-config/shared`
/// - Windows: `{FOLDERID_RoamingAppData}\org-config\shared`
///
/// Falls back to `.org-config/shared` in the current directory if the
/// platform directory cannot be determined.
///
/// This can be overridden by the `--shared-dir` CLI flag, the
/// `ORG_CONFIG_SHARED_DIR` environment variable or the settings file.
pub fn default_shared_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("org-config"))
        .unwrap_or_else(|| PathBuf::from(".org-config"))
        .join("shared")
}
