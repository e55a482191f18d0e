//! Process exit codes reported by the `org-config` binary.
//!
//! - `0`: success, or no changes needed
//! - `1`: general error (including a missing `GITHUB_TOKEN`)
//! - `2`: no configuration file found for a formatter (also used by clap for
//!   invalid command-line usage)
//! - `9`: propagator precondition failure (no targets, missing list file,
//!   missing artifact, declined confirmation)
//!
//! A formatter that fails its verification run returns its own exit code,
//! which is passed through unchanged.

/// Successful run.
pub const SUCCESS: i32 = 0;

/// General error.
pub const ERROR: i32 = 1;

/// No configuration file was found for the requested tool.
pub const CONFIG_NOT_FOUND: i32 = 2;

/// A propagator precondition was not met.
pub const PRECONDITION_FAILED: i32 = 9;
