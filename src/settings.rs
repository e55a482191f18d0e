//! # Settings File
//!
//! Optional organization settings loaded from `org-config.yaml` (or the path
//! given by `--settings` / `ORG_CONFIG_SETTINGS`). Every field has a default,
//! so a missing default-location file is not an error; a missing explicitly
//! requested file is.
//!
//! ```yaml
//! org: scritical
//! shared_dir: /opt/org-config/shared
//! propagate:
//!   branch: update-rtd-config
//!   commit_message: "Update .readthedocs.yaml"
//! ```
//!
//! Command-line flags and environment variables take precedence over values
//! from this file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// GitHub organization owning the managed repositories
    pub org: String,
    /// Directory holding the shared configuration files
    pub shared_dir: Option<PathBuf>,
    /// Change propagator settings
    pub propagate: PropagateSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            org: defaults::DEFAULT_ORG.to_string(),
            shared_dir: None,
            propagate: PropagateSettings::default(),
        }
    }
}

/// Settings for the change propagator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropagateSettings {
    /// Branch created in every target repository
    pub branch: String,
    /// Commit message used for the overlaid artifact
    pub commit_message: String,
    /// Title of the opened pull request
    pub pr_title: String,
    /// Body of the opened pull request
    pub pr_body: String,
    /// Path of the artifact inside each target; defaults to the artifact's file name
    pub destination: Option<PathBuf>,
    /// Where target repositories are cloned
    pub work_dir: PathBuf,
}

impl Default for PropagateSettings {
    fn default() -> Self {
        Self {
            branch: defaults::DEFAULT_BRANCH.to_string(),
            commit_message: "Update shared configuration from the organization defaults"
                .to_string(),
            pr_title: "Update shared configuration".to_string(),
            pr_body: "## Purpose\n\
                      This pull request updates a configuration file that is shared across \
                      the organization. It was opened automatically by `org-config propagate`.\n\n\
                      ## Expected time until merged\n\
                      Please review and merge at your convenience.\n"
                .to_string(),
            destination: None,
            work_dir: PathBuf::from(defaults::DEFAULT_WORK_DIR),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `org-config.yaml` in `base_dir` is read when present and defaults are
    /// used otherwise.
    pub fn load(explicit: Option<&Path>, base_dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Settings {
                        path: path.display().to_string(),
                        message: "file not found".to_string(),
                    });
                }
                Self::from_file(path)
            }
            None => {
                let path = base_dir.join(defaults::SETTINGS_FILENAME);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    log::debug!("No settings file at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| Error::Settings {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parse settings from a YAML string. An empty document yields defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Shared configuration directory, preferring an explicit override.
    pub fn shared_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.shared_dir.clone())
            .unwrap_or_else(defaults::default_shared_dir)
    }
}
