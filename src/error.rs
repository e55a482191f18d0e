//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `org-config` application. It uses the `thiserror` library to create a
//! single `Error` enum that covers the failure modes of the config resolver,
//! the formatter wrappers, the change propagator and the label synchronizer.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors. Each
//!   variant carries enough context (tool name, command, stderr, searched
//!   paths) to produce an actionable console message.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! - **`Error::exit_code`**: Maps each error onto the process exit code the
//!   binary reports. See [`crate::exit_codes`] for the conventions.
//!
//! Wrapper-level errors (missing config, failed precondition, failed tool)
//! are fatal to the current process. Per-repository failures inside a
//! propagation batch are recorded in the run report instead and never bubble
//! up through this type.

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

/// Main error type for org-config operations
#[derive(Error, Debug)]
pub enum Error {
    /// No configuration file was found for a tool in any candidate location.
    #[error("No configuration found for {tool}; searched: {}", format_paths(searched))]
    ConfigNotFound {
        tool: String,
        /// Every path that was checked, in priority order
        searched: Vec<PathBuf>,
    },

    /// A wrapped external tool could not be started at all.
    #[error("Failed to run {tool}: {message}")]
    ToolSpawn { tool: String, message: String },

    /// A required input was missing or the operator declined to continue.
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// A required environment variable is not set.
    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {repo}: {command} - {stderr}")]
    GitCommand {
        command: String,
        repo: String,
        stderr: String,
    },

    /// An error occurred while executing a GitHub CLI command.
    #[error("GitHub CLI command failed: {command} - {stderr}")]
    GhCommand { command: String, stderr: String },

    /// The label specification file is malformed.
    #[error("Invalid label specification: {message}")]
    LabelSpec { message: String },

    /// The optional settings file could not be interpreted.
    #[error("Settings error in {path}: {message}")]
    Settings { path: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// An INI parsing error, wrapped from `ini::Error`.
    #[error("INI parsing error: {0}")]
    Ini(#[from] ini::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigNotFound { .. } => exit_codes::CONFIG_NOT_FOUND,
            Error::Precondition { .. } => exit_codes::PRECONDITION_FAILED,
            _ => exit_codes::ERROR,
        }
    }

    /// Shorthand for a precondition failure.
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition {
            message: message.into(),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no candidates)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
