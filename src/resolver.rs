//! # Configuration Resolution
//!
//! Decides which configuration file governs an external tool. Candidates are
//! checked in a fixed priority order and the first one that exists wins:
//!
//! 1. an explicitly supplied path (e.g. `--config`),
//! 2. local override files inside the current repository, in order,
//! 3. shared organization defaults, in order.
//!
//! Some tools only pick up a configuration file that sits next to the files
//! being processed. For those, a shared config is copied into the working
//! directory by [`ResolvedConfig::materialize`], which hands back a
//! [`ConfigHandle`]. The copy is deleted when the handle is dropped, so it
//! disappears on success, on tool failure, on early return and on panic
//! unwind alike.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};

/// Where a resolved configuration file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Supplied on the command line
    Explicit,
    /// Override committed in the current repository
    Local,
    /// Organization-wide default
    Shared,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit"),
            ConfigSource::Local => write!(f, "local override"),
            ConfigSource::Shared => write!(f, "shared default"),
        }
    }
}

/// Ordered search description for one tool's configuration file.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Name of the tool, used in messages
    pub tool_name: String,
    explicit: Option<PathBuf>,
    local: Vec<PathBuf>,
    shared: Vec<PathBuf>,
}

impl ToolConfig {
    /// Start a search for `tool_name` with no candidates.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            ..Self::default()
        }
    }

    /// Set the explicitly supplied path, if any.
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Append local override candidates.
    pub fn with_local<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.local.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Append shared fallback candidates.
    pub fn with_shared<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.shared.extend(paths.into_iter().map(Into::into));
        self
    }

    /// All candidates in priority order, tagged with their source.
    pub fn search_order(&self) -> Vec<(ConfigSource, &Path)> {
        let explicit = self
            .explicit
            .iter()
            .map(|p| (ConfigSource::Explicit, p.as_path()));
        let local = self.local.iter().map(|p| (ConfigSource::Local, p.as_path()));
        let shared = self
            .shared
            .iter()
            .map(|p| (ConfigSource::Shared, p.as_path()));
        explicit.chain(local).chain(shared).collect()
    }

    /// Pick the first candidate that exists on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] listing every searched path when no
    /// candidate exists.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let order = self.search_order();
        for (source, path) in &order {
            debug!("{}: checking {} candidate {}", self.tool_name, source, path.display());
            if path.is_file() {
                info!(
                    "{}: using {} config {}",
                    self.tool_name,
                    source,
                    path.display()
                );
                return Ok(ResolvedConfig {
                    tool: self.tool_name.clone(),
                    path: path.to_path_buf(),
                    source: *source,
                });
            }
        }

        Err(Error::ConfigNotFound {
            tool: self.tool_name.clone(),
            searched: order.into_iter().map(|(_, p)| p.to_path_buf()).collect(),
        })
    }
}

/// Resolve a tool's configuration file from explicit, local and shared
/// candidates.
pub fn resolve(
    tool: &str,
    explicit: Option<&Path>,
    local: &[PathBuf],
    shared: &[PathBuf],
) -> Result<ResolvedConfig> {
    ToolConfig::new(tool)
        .with_explicit(explicit.map(Path::to_path_buf))
        .with_local(local.iter().cloned())
        .with_shared(shared.iter().cloned())
        .resolve()
}

/// The configuration file selected for a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Tool the config belongs to
    pub tool: String,
    /// Path of the selected file
    pub path: PathBuf,
    /// Which tier of the search it came from
    pub source: ConfigSource,
}

impl ResolvedConfig {
    /// Whether the file is the organization default.
    pub fn is_shared(&self) -> bool {
        self.source == ConfigSource::Shared
    }

    /// Make the config usable by a tool running in `work_dir`.
    ///
    /// When `needs_local_copy` is set and the config is a shared default, the
    /// file is copied to `work_dir/file_name` and the returned handle deletes
    /// it on drop. Otherwise the handle simply points at the resolved file.
    pub fn materialize(
        &self,
        work_dir: &Path,
        file_name: &str,
        needs_local_copy: bool,
    ) -> Result<ConfigHandle> {
        if !(needs_local_copy && self.is_shared()) {
            return Ok(ConfigHandle {
                path: self.path.clone(),
                copy: None,
            });
        }

        let target = work_dir.join(file_name);
        if target.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "refusing to overwrite {} with the shared {} config",
                    target.display(),
                    self.tool
                ),
            )));
        }

        fs::copy(&self.path, &target)?;
        debug!(
            "{}: copied shared config {} to {}",
            self.tool,
            self.path.display(),
            target.display()
        );

        Ok(ConfigHandle {
            path: target.clone(),
            copy: Some(SharedCopy { path: target }),
        })
    }
}

/// A configuration file ready for a tool invocation.
#[derive(Debug)]
pub struct ConfigHandle {
    path: PathBuf,
    copy: Option<SharedCopy>,
}

impl ConfigHandle {
    /// Path the tool should read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when this handle owns a temporary copy of the shared config.
    pub fn is_shared_copy(&self) -> bool {
        self.copy.is_some()
    }
}

/// Temporary copy of a shared config, removed on drop.
#[derive(Debug)]
struct SharedCopy {
    path: PathBuf,
}

impl Drop for SharedCopy {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("removed temporary config {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "failed to remove temporary config {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
