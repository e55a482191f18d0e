//! INI configuration combining.
//!
//! Merges an organization default INI file (for example a shared linter
//! config) with a repository-specific one. Values from the repository file
//! override the defaults key by key within each section; sections and keys
//! only present in one file are kept. When the repository file does not
//! exist the default is written out unchanged.
//!
//! Option names are case-insensitive and written in lowercase, so `Jobs`
//! in the repository file replaces `jobs` from the default. Section names
//! keep their case.

use std::path::Path;

use ini::Ini;
use log::{debug, info};

use crate::error::Result;

/// Merge `overrides` on top of `base`, returning the combined config.
///
/// Keys are lowercased on the way in; a later value for the same lowercased
/// key replaces the earlier one.
pub fn merge_ini(base: &Ini, overrides: &Ini) -> Ini {
    let mut merged = Ini::new();
    for (layer, ini) in [("default", base), ("override", overrides)] {
        for (section, props) in ini.iter() {
            let target = merged
                .entry(section.map(str::to_string))
                .or_insert_with(Default::default);
            for (key, value) in props.iter() {
                debug!("{} [{}] {}", layer, section.unwrap_or_default(), key);
                target.insert(key.to_lowercase(), value);
            }
        }
    }
    merged
}

/// Combine `default_path` and `repo_path` into `output_path`.
pub fn combine_files(default_path: &Path, repo_path: &Path, output_path: &Path) -> Result<()> {
    let base = Ini::load_from_file(default_path)?;

    let merged = if repo_path.is_file() {
        info!(
            "Merging {} over {}",
            repo_path.display(),
            default_path.display()
        );
        let overrides = Ini::load_from_file(repo_path)?;
        merge_ini(&base, &overrides)
    } else {
        info!(
            "{} not found, using {} alone",
            repo_path.display(),
            default_path.display()
        );
        merge_ini(&base, &Ini::new())
    };

    merged.write_to_file(output_path)?;
    Ok(())
}
