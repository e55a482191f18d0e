//! External tool invocation.
//!
//! Every external program (clang-format, fprettify, git, gh,
//! github-label-sync) is run through the [`ToolRunner`] trait so that the
//! wrappers can be exercised in tests without the real tools installed.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `1` when the process was terminated by a signal
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the tool exited with status zero.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Echo the captured streams to the console.
    pub fn echo(&self) {
        if !self.stdout.is_empty() {
            print!("{}", self.stdout);
        }
        if !self.stderr.is_empty() {
            eprint!("{}", self.stderr);
        }
    }
}

/// Trait for running external programs - allows mocking in tests
pub trait ToolRunner {
    /// Run `program` with `args` in `cwd` and wait for it to finish.
    ///
    /// A non-zero exit status is not an error here; only failing to start the
    /// program is.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ToolOutput> {
        self.run_with_env(program, args, cwd, &[])
    }

    /// Like [`ToolRunner::run`], with extra environment variables set on the
    /// child. Secrets go here rather than on the command line.
    fn run_with_env(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        env: &[(&str, &str)],
    ) -> Result<ToolOutput>;
}

/// Runs programs found on `PATH` with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run_with_env(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        env: &[(&str, &str)],
    ) -> Result<ToolOutput> {
        debug!("running {} {} in {}", program, args.join(" "), cwd.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(env.iter().copied())
            .output()
            .map_err(|e| Error::ToolSpawn {
                tool: program.to_string(),
                message: e.to_string(),
            })?;

        Ok(ToolOutput {
            code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
