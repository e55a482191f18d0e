//! # Console Output
//!
//! Chooses between emoji and plain-text status markers for the
//! human-readable output of `org-config`.
//!
//! The following settings are respected, in order:
//! - `--color=always|never|auto`
//! - `NO_COLOR` (any value) disables decoration, see https://no-color.org/
//! - `CLICOLOR=0` disables, `CLICOLOR_FORCE=1` forces decoration
//! - `TERM=dumb` disables decoration
//! - otherwise decoration follows the terminal's color support

use std::env;

/// Output configuration for controlling decorated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether emoji markers should be used.
    pub use_color: bool,
}

impl OutputConfig {
    /// Build from the `--color` flag value and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// Marker for a status line.
    pub fn marker(&self, status: Status) -> &'static str {
        let (emoji, plain) = status.markers();
        if self.use_color {
            emoji
        } else {
            plain
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Kinds of status lines printed by the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Fail,
    Info,
    Warn,
    Search,
}

impl Status {
    fn markers(self) -> (&'static str, &'static str) {
        match self {
            Status::Ok => ("✅", "[OK]"),
            Status::Fail => ("❌", "[FAIL]"),
            Status::Info => ("ℹ️ ", "[INFO]"),
            Status::Warn => ("⚠️ ", "[WARN]"),
            Status::Search => ("🔍", "[SCAN]"),
        }
    }
}
