//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

use crate::models::BuildTool;

/// auto-update-report - merge dependency reports into one
///
/// Collects relocation data and filtered Renovate suggestions from a
/// project tree, folds in Dependency-Track vulnerability and policy
/// exports, and writes a single JSON report keyed by package coordinate.
///
/// Examples:
///   auto-update-report ./my-project Maven
///   auto-update-report ./my-project Gradle --report-dir ./reports
///   auto-update-report ./my-project Maven --dry-run
///   auto-update-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Project root to scan for relocation and Renovate files
    #[arg(value_name = "PROJECT_ROOT", required_unless_present = "init_config")]
    pub project_root: Option<PathBuf>,

    /// Build tool that produced the Renovate report (Maven or Gradle)
    #[arg(value_name = "BUILD_TOOL", required_unless_present = "init_config")]
    pub build_tool: Option<BuildTool>,

    /// Directory containing the Dependency-Track exports
    ///
    /// Defaults to the current directory or `general.report_dir` from config.
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Output file path for the merged report
    ///
    /// Relative paths are resolved against the report directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory name to skip while scanning the project
    #[arg(long, value_name = "NAME")]
    pub exclude_dir: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .auto-update-report.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Indent the output JSON
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the input files that would be merged and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .auto-update-report.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match self.project_root {
            Some(ref root) if !root.exists() => {
                return Err(format!("Project root does not exist: {}", root.display()));
            }
            Some(ref root) if !root.is_dir() => {
                return Err(format!("Project root is not a directory: {}", root.display()));
            }
            Some(_) => {}
            None => return Err("Project root is required".to_string()),
        }

        if self.build_tool.is_none() {
            return Err("Build tool is required (Maven or Gradle)".to_string());
        }

        if let Some(ref name) = self.exclude_dir {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(format!("Exclude dir must be a plain directory name: '{}'", name));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
