//! Loaders for the individual report files.
//!
//! Every file is read into memory whole and parsed with `serde_json`.
//! A missing or malformed file is an error; nothing is skipped.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ReportError;
use crate::models::{
    BuildTool, PolicyViolationFinding, RelocatedDependency, RelocationDocument,
    RenovateDependency, VulnerabilityFinding,
};

/// Read and deserialize a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ReportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the dependency descriptors of a relocation file.
pub fn load_relocations(path: &Path) -> Result<Vec<RelocatedDependency>, ReportError> {
    let document: RelocationDocument = read_json(path)?;
    debug!(
        "{}: {} dependency descriptors",
        path.display(),
        document.dependencies.len()
    );
    Ok(document.dependencies)
}

/// Load the update entries of a Renovate file for the given build tool.
pub fn load_renovate(
    path: &Path,
    tool: BuildTool,
) -> Result<Vec<RenovateDependency>, ReportError> {
    let mut document: Value = read_json(path)?;
    let pointer = tool.entries_pointer();

    let entries = document
        .pointer_mut(pointer)
        .map(Value::take)
        .ok_or_else(|| ReportError::MissingEntries {
            path: path.to_path_buf(),
            tool,
            pointer,
        })?;

    let entries: Vec<RenovateDependency> =
        serde_json::from_value(entries).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("{}: {} {} entries", path.display(), entries.len(), tool);
    Ok(entries)
}

/// Load a Dependency-Track vulnerability export.
pub fn load_vulnerabilities(path: &Path) -> Result<Vec<VulnerabilityFinding>, ReportError> {
    read_json(path)
}

/// Load a Dependency-Track policy-violation export.
pub fn load_policy_violations(
    path: &Path,
) -> Result<Vec<PolicyViolationFinding>, ReportError> {
    read_json(path)
}
