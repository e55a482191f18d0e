//! Shared test utilities for the CLI end-to-end tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("src/a.cpp", "int x;\n");
//!     fixture.command().arg("clang-format").assert().success();
//! }
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use std::env;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::fixtures;
    pub use super::TestFixture;
}

/// File contents used across tests.
#[allow(dead_code)]
pub mod fixtures {
    /// A small valid label specification.
    pub const LABELS: &str = r#"- name: bug
  color: d73a4a
  description: Something isn't working
- name: enhancement
  color: a2eeef
  aliases: [feature]
"#;

    /// A label specification with an invalid color.
    pub const BAD_LABELS: &str = r#"- name: bug
  color: red
"#;

    /// Minimal clang-format style.
    pub const CLANG_FORMAT: &str = "BasedOnStyle: LLVM\nIndentWidth: 4\n";

    /// GraphQL output of the organization repository query.
    pub const ORG_REPOS_JSON: &str = r#"{"data":{"organization":{"repositories":{
  "pageInfo":{"hasNextPage":false,"endCursor":null},
  "nodes":[
    {"nameWithOwner":"scritical/adflow","isArchived":false,"repositoryTopics":{"nodes":[]}},
    {"nameWithOwner":"scritical/retired","isArchived":true,"repositoryTopics":{"nodes":[]}},
    {"nameWithOwner":"scritical/jfm-2023","isArchived":false,
     "repositoryTopics":{"nodes":[{"topic":{"name":"paper"}}]}},
    {"nameWithOwner":"scritical/idwarp","isArchived":false,"repositoryTopics":{"nodes":[]}}
  ]}}}}"#;
}

/// A temporary working directory with helpers for populating it.
///
/// The command created by [`TestFixture::command`] runs inside the
/// directory, with `ORG_CONFIG_SHARED_DIR` pointing at `<dir>/shared` and
/// a `bin/` directory prepended to `PATH` so tests can install fake tools.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Put a file into the shared config directory.
    #[allow(dead_code)]
    pub fn with_shared(self, name: &str, content: &str) -> Self {
        let path = format!("shared/{}", name);
        self.with_file(&path, content)
    }

    /// Install an executable shell script as `bin/<name>`.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn with_tool(self, name: &str, script: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let child = self.temp_dir.child(format!("bin/{}", name));
        child
            .write_str(&format!("#!/bin/sh\n{}\n", script))
            .expect("Failed to write tool script");
        let mut perms = std::fs::metadata(child.path())
            .expect("Failed to stat tool script")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(child.path(), perms).expect("Failed to chmod tool script");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path to a file inside the fixture.
    #[allow(dead_code)]
    pub fn file(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("org-config");
        let path = env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![self.path().join("bin")];
        paths.extend(env::split_paths(&path));
        cmd.current_dir(self.path())
            .env("PATH", env::join_paths(paths).expect("Failed to build PATH"))
            .env("ORG_CONFIG_SHARED_DIR", self.path().join("shared"))
            .env_remove("ORG_CONFIG_SETTINGS")
            .env_remove("ORG_CONFIG_ORG")
            .env_remove("RUST_LOG")
            .arg("--color=never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
