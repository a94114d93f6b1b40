//! Output report generation.
//!
//! Serializes the merged records to JSON, writes the result to disk, and
//! renders the plain-text run summary.

use std::fs;
use std::path::Path;

use crate::error::ReportError;
use crate::models::{MergedRecord, ReportSummary};

/// Serialize the merged records as a single JSON array.
///
/// Compact unless `pretty` is set.
pub fn generate_json_report(
    records: &[MergedRecord],
    pretty: bool,
) -> Result<String, ReportError> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(json)
}

/// Write the report to a file, creating parent directories as needed.
///
/// The file is overwritten in place.
pub fn write_report(path: &Path, content: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate a text summary of a completed run.
pub fn generate_summary_text(summary: &ReportSummary) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Generated: {}",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!(
        "Inputs: {} relocation file(s), {} renovate file(s)",
        summary.relocation_files, summary.renovate_files
    ));
    lines.push(format!("Records: {}", summary.records));
    lines.push(format!("- With update suggestions: {}", summary.with_updates));
    lines.push(format!("- Vulnerabilities: {}", summary.vulnerabilities));
    lines.push(format!("- Policy violations: {}", summary.policy_violations));

    lines.join("\n")
}
