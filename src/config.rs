//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.auto-update-report.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".auto-update-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input file names.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding the Dependency-Track exports.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Output file path. Relative paths resolve against `report_dir`.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Directory name skipped while scanning the project.
    #[serde(default = "default_exclude_dir")]
    pub exclude_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            output: default_output(),
            exclude_dir: default_exclude_dir(),
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("../final-reports/auto-update-report.json")
}

fn default_exclude_dir() -> String {
    "auto-update-report".to_string()
}

/// Names of the input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Relocation data, searched recursively.
    #[serde(default = "default_relocations")]
    pub relocations: String,

    /// Filtered Renovate output, searched recursively.
    #[serde(default = "default_renovate")]
    pub renovate: String,

    /// Vulnerability export, read from `report_dir`.
    #[serde(default = "default_vulnerabilities")]
    pub vulnerabilities: String,

    /// Policy-violation export, read from `report_dir`.
    #[serde(default = "default_policy_violations")]
    pub policy_violations: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            relocations: default_relocations(),
            renovate: default_renovate(),
            vulnerabilities: default_vulnerabilities(),
            policy_violations: default_policy_violations(),
        }
    }
}

fn default_relocations() -> String {
    "dependency-relocated-date.json".to_string()
}

fn default_renovate() -> String {
    "renovate-filtered.json".to_string()
}

fn default_vulnerabilities() -> String {
    "dependency-track-vulnerability-report.json".to_string()
}

fn default_policy_violations() -> String {
    "dependency-track-policy-violations.json".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Indent the output JSON.
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load `.auto-update-report.toml` from `dir` if it exists.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref report_dir) = args.report_dir {
            self.general.report_dir = report_dir.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(ref exclude_dir) = args.exclude_dir {
            self.general.exclude_dir = exclude_dir.clone();
        }

        if args.pretty {
            self.report.pretty = true;
        }
    }

    /// Path of the Dependency-Track vulnerability export.
    pub fn vulnerability_report_path(&self) -> PathBuf {
        self.general.report_dir.join(&self.sources.vulnerabilities)
    }

    /// Path of the Dependency-Track policy-violation export.
    pub fn policy_violation_report_path(&self) -> PathBuf {
        self.general.report_dir.join(&self.sources.policy_violations)
    }

    /// Resolved output path.
    pub fn output_path(&self) -> PathBuf {
        if self.general.output.is_absolute() {
            self.general.output.clone()
        } else {
            self.general.report_dir.join(&self.general.output)
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
