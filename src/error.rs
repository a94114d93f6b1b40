//! Error type for loading and merging the input reports.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, merging or writing reports.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Reading an input file failed.
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid JSON of the expected shape.
    #[error("Failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Directory traversal failed.
    #[error("Failed to scan {root}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The Renovate report has no entry list for the selected build tool.
    #[error("No {tool} dependency list at '{pointer}' in {path}")]
    MissingEntries {
        path: PathBuf,
        tool: crate::models::BuildTool,
        pointer: &'static str,
    },

    /// The build tool argument is neither Maven nor Gradle.
    #[error("Unsupported build tool '{0}' (expected Maven or Gradle)")]
    UnsupportedBuildTool(String),

    /// Writing the output report failed.
    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the output report failed.
    #[error("Failed to serialize report")]
    Serialize(#[from] serde_json::Error),
}
