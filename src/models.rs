//! Data models for the dependency report.
//!
//! This module contains the merged output record, the shapes of the four
//! input documents, and the run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Build tool that produced the Renovate report.
///
/// Each variant selects a different path into the Renovate document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTool {
    Maven,
    Gradle,
}

impl BuildTool {
    /// JSON pointer to the list of per-dependency update entries.
    pub fn entries_pointer(&self) -> &'static str {
        match self {
            BuildTool::Maven => "/config/maven/0/deps",
            BuildTool::Gradle => "/config/gradle/0/deps",
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildTool::Maven => write!(f, "Maven"),
            BuildTool::Gradle => write!(f, "Gradle"),
        }
    }
}

impl FromStr for BuildTool {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "maven" => Ok(BuildTool::Maven),
            "gradle" => Ok(BuildTool::Gradle),
            _ => Err(ReportError::UnsupportedBuildTool(s.to_string())),
        }
    }
}

/// A candidate upgrade target for a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    /// Always empty; major candidates are reported in `non_major` as well.
    pub major: String,
    /// The candidate version.
    pub non_major: String,
    /// Renovate update type (`major`, `minor`, `patch`, ...).
    pub update_type: String,
}

/// A vulnerability attached to a dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub vuln_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Exploit Prediction Scoring System probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epss_score: Option<f64>,
}

/// A policy violation attached to a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolation {
    pub component_uuid: String,
    pub violation_state: String,
    #[serde(rename = "type")]
    pub violation_type: String,
    pub policy_name: String,
}

/// One entry of the unified report, keyed by (group, artifact, version).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRecord {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub new_versions: Vec<UpdateInfo>,
    pub scope: String,
    pub last_updated_date: String,
    /// Relocation descriptors, passed through as found in the input.
    pub relocations: Vec<Value>,
    pub vulnerabilities: Vec<Vulnerability>,
    /// Absent until the first violation is merged in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_violations: Option<Vec<PolicyViolation>>,
}

impl MergedRecord {
    /// Creates a record with every collection empty.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            new_versions: Vec::new(),
            scope: String::new(),
            last_updated_date: String::new(),
            relocations: Vec::new(),
            vulnerabilities: Vec::new(),
            policy_violations: None,
        }
    }

    /// Exact coordinate match.
    pub fn is(&self, group_id: &str, artifact_id: &str, version: &str) -> bool {
        self.is_package(group_id, artifact_id) && self.version == version
    }

    /// Match on group and artifact, ignoring the version.
    pub fn is_package(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }

    /// Returns the `group:artifact:version` coordinate.
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Contents of a `dependency-relocated-date.json` file.
#[derive(Debug, Clone, Deserialize)]
pub struct RelocationDocument {
    pub dependencies: Vec<RelocatedDependency>,
}

/// A dependency descriptor produced by the dependency-tree analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocatedDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub last_updated_date: String,
    #[serde(default)]
    pub relocations: Option<Vec<Value>>,
}

/// A per-dependency entry in the Renovate report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenovateDependency {
    pub dep_name: String,
    #[serde(default)]
    pub current_value: String,
    #[serde(default)]
    pub updates: Vec<RenovateUpdate>,
}

impl RenovateDependency {
    /// Splits `dep_name` into (group, artifact).
    ///
    /// A name without a `:` separator (a Gradle plugin id, say) becomes the
    /// group with an empty artifact. Any parts after the second are ignored.
    pub fn coordinates(&self) -> (&str, &str) {
        let mut parts = self.dep_name.split(':');
        let group_id = parts.next().unwrap_or_default();
        let artifact_id = parts.next().unwrap_or_default();
        (group_id, artifact_id)
    }

    /// Whether `dep_name` carries a `group:artifact` separator.
    pub fn has_artifact(&self) -> bool {
        self.dep_name.contains(':')
    }

    /// Update candidates in the `major` or `non-major` buckets.
    pub fn update_infos(&self) -> Vec<UpdateInfo> {
        self.updates
            .iter()
            .filter(|u| matches!(u.bucket.as_deref(), Some("major") | Some("non-major")))
            .map(|u| UpdateInfo {
                major: String::new(),
                non_major: u.new_version.clone().unwrap_or_default(),
                update_type: u.update_type.clone().unwrap_or_default(),
            })
            .collect()
    }
}

/// A single update candidate in the Renovate report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenovateUpdate {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub new_version: Option<String>,
    #[serde(default)]
    pub update_type: Option<String>,
}

/// Component reference in the Dependency-Track exports.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// An entry of the Dependency-Track vulnerability report.
#[derive(Debug, Clone, Deserialize)]
pub struct VulnerabilityFinding {
    pub component: Component,
    pub vulnerability: Vulnerability,
}

/// An entry of the Dependency-Track policy-violation report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolationFinding {
    pub component: Component,
    #[serde(default)]
    pub violation_state: String,
    #[serde(rename = "type", default)]
    pub violation_type: String,
    #[serde(default)]
    pub policy_name: String,
}

impl PolicyViolationFinding {
    /// The violation as stored on a merged record.
    pub fn to_violation(&self) -> PolicyViolation {
        PolicyViolation {
            component_uuid: self.component.uuid.clone(),
            violation_state: self.violation_state.clone(),
            violation_type: self.violation_type.clone(),
            policy_name: self.policy_name.clone(),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    /// Number of records in the report.
    pub records: usize,
    /// Records carrying at least one update suggestion.
    pub with_updates: usize,
    /// Total vulnerabilities across all records.
    pub vulnerabilities: usize,
    /// Total policy violations across all records.
    pub policy_violations: usize,
    /// Relocation files consumed.
    pub relocation_files: usize,
    /// Renovate files consumed.
    pub renovate_files: usize,
    pub generated_at: DateTime<Utc>,
}

impl ReportSummary {
    /// Creates a summary from the merged records.
    pub fn from_records(
        records: &[MergedRecord],
        relocation_files: usize,
        renovate_files: usize,
    ) -> Self {
        Self {
            records: records.len(),
            with_updates: records.iter().filter(|r| !r.new_versions.is_empty()).count(),
            vulnerabilities: records.iter().map(|r| r.vulnerabilities.len()).sum(),
            policy_violations: records
                .iter()
                .filter_map(|r| r.policy_violations.as_ref())
                .map(Vec::len)
                .sum(),
            relocation_files,
            renovate_files,
            generated_at: Utc::now(),
        }
    }
}
