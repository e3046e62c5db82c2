// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `start`: run an engine in the foreground until a terminating signal
//! - `json2srs`: compile a JSON rule document into a binary rule set
//! - `validate`: load and validate a config without starting anything
//! - `version`: show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Harbor - proxy engine supervisor
#[derive(Parser, Debug)]
#[command(
    name = "harbor",
    author = "Sylvex <contact@sylvex.io>",
    version = harbor_core::VERSION,
    about = "Runs and supervises a proxy engine instance",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "HARBOR_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "HARBOR_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Force the engine's own log level to trace
    #[arg(long, global = true)]
    pub engine_debug: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the harbor CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the engine and block until it is terminated
    ///
    /// SIGHUP reloads the config in place. SIGINT, SIGTERM and SIGQUIT stop
    /// the engine and exit.
    Start(StartArgs),

    /// Compile a JSON rule document into a binary rule set
    #[command(name = "json2srs")]
    Json2Srs(Json2SrsArgs),

    /// Validate a config file without starting the engine
    Validate(ValidateArgs),

    /// Show version information
    Version,
}

impl Commands {
    /// Returns the command name used in failure messages.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Start(_) => "start",
            Commands::Json2Srs(_) => "json2srs",
            Commands::Validate(_) => "validate",
            Commands::Version => "version",
        }
    }
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `start` command.
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Engine config file
    pub config: PathBuf,

    /// Working directory, created if missing; an empty value keeps the current one
    pub work_dir: String,

    /// Optional instance tag recorded in logs
    pub tag: Option<String>,
}

/// Arguments for the `json2srs` command.
#[derive(Args, Debug, Clone)]
pub struct Json2SrsArgs {
    /// Source rule document
    pub json: PathBuf,

    /// Destination binary rule set
    pub output: PathBuf,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Engine config file
    pub config: PathBuf,

    /// Output format for the summary
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_command() {
        let cli = Cli::parse_from(["harbor", "start", "config.json", "/var/lib/harbor", "edge"]);
        match cli.command {
            Commands::Start(args) => {
                assert_eq!(args.config, PathBuf::from("config.json"));
                assert_eq!(args.work_dir, "/var/lib/harbor");
                assert_eq!(args.tag.as_deref(), Some("edge"));
            }
            other => panic!("Expected Start command, got {other:?}"),
        }
    }

    #[test]
    fn test_start_without_tag() {
        let cli = Cli::parse_from(["harbor", "start", "config.json", ""]);
        match cli.command {
            Commands::Start(args) => {
                assert!(args.work_dir.is_empty());
                assert!(args.tag.is_none());
            }
            other => panic!("Expected Start command, got {other:?}"),
        }
    }

    #[test]
    fn test_json2srs_command() {
        let cli = Cli::parse_from(["harbor", "json2srs", "rules.json", "rules.srs"]);
        assert_eq!(cli.command.name(), "json2srs");
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "harbor",
            "validate",
            "config.json",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--engine-debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(cli.engine_debug);
    }

    #[test]
    fn test_missing_command_is_rejected() {
        assert!(Cli::try_parse_from(["harbor"]).is_err());
        assert!(Cli::try_parse_from(["harbor", "start", "config.json"]).is_err());
    }
}
