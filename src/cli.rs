//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use org_config::formatter::Formatter;
use org_config::output::OutputConfig;
use org_config::settings::Settings;

use crate::commands;

/// org-config - Organization-wide formatter, documentation and label configuration
#[derive(Parser, Debug)]
#[command(name = "org-config")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Settings file (defaults to ./org-config.yaml when present)
    #[arg(long, global = true, value_name = "FILE", env = "ORG_CONFIG_SETTINGS")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Format C/C++ sources with clang-format
    ClangFormat(commands::format::FormatArgs),

    /// Format Fortran 90 sources with fprettify
    Fprettify(commands::format::FormatArgs),

    /// Roll a shared file out to a list of repositories
    Propagate(commands::propagate::PropagateArgs),

    /// Manage issue labels across the organization
    #[command(subcommand)]
    Labels(commands::labels::LabelsCommand),

    /// Merge a repository INI config over the organization default
    CombineConfig(commands::combine::CombineArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// State shared by every command.
pub struct Context {
    pub settings: Settings,
    pub output: OutputConfig,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        init_logging(&self.log_level);

        let output = OutputConfig::from_env_and_flag(&self.color);
        let cwd = std::env::current_dir()?;
        let settings = Settings::load(self.settings.as_deref(), &cwd)?;
        let ctx = Context { settings, output };

        match self.command {
            Commands::ClangFormat(args) => {
                commands::format::execute(Formatter::ClangFormat, args, &ctx)
            }
            Commands::Fprettify(args) => {
                commands::format::execute(Formatter::Fprettify, args, &ctx)
            }
            Commands::Propagate(args) => commands::propagate::execute(args, &ctx),
            Commands::Labels(cmd) => commands::labels::execute(cmd, &ctx),
            Commands::CombineConfig(args) => commands::combine::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Initialize `env_logger`; `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Convert a tool or error exit status into a process exit code.
pub fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
