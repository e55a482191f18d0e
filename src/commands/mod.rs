//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `org-config` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` (and the shared
//!   [`crate::cli::Context`] where settings matter) and returns the process
//!   exit code.
//!
//! The `execute` functions orchestrate calls into the `org_config` library
//! and own all console output.

pub mod combine;
pub mod completions;
pub mod format;
pub mod labels;
pub mod propagate;
