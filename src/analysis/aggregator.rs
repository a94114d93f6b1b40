//! Record aggregation across the four input reports.
//!
//! The aggregator owns the growing list of merged records. Passes must run
//! in order: relocations, updates, vulnerabilities, policy violations, since
//! later passes match against records inserted by earlier ones.

use tracing::{debug, warn};

use crate::models::{
    MergedRecord, PolicyViolationFinding, RelocatedDependency, RenovateDependency,
    VulnerabilityFinding,
};

/// Counts of what a single merge pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Entries that created a new record.
    pub inserted: usize,
    /// Entries merged into an existing record.
    pub merged: usize,
    /// Entries ignored (duplicates, no update candidates).
    pub skipped: usize,
}

impl std::ops::AddAssign for PassStats {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.merged += other.merged;
        self.skipped += other.skipped;
    }
}

/// Accumulates merged records keyed by package coordinate.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    records: Vec<MergedRecord>,
}

impl ReportAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records merged so far, in insertion order.
    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    /// Consume the aggregator and return the records.
    pub fn into_records(self) -> Vec<MergedRecord> {
        self.records
    }

    fn find(&self, group_id: &str, artifact_id: &str, version: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.is(group_id, artifact_id, version))
    }

    fn find_package(&self, group_id: &str, artifact_id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.is_package(group_id, artifact_id))
    }

    /// Merge dependency descriptors from one relocation file.
    ///
    /// The first descriptor seen for a coordinate wins; later duplicates are
    /// dropped without touching the existing record.
    pub fn merge_relocations(&mut self, dependencies: Vec<RelocatedDependency>) -> PassStats {
        let mut stats = PassStats::default();

        for dep in dependencies {
            if self.find(&dep.group_id, &dep.artifact_id, &dep.version).is_some() {
                debug!(
                    "Duplicate relocation entry {}:{}:{} ignored",
                    dep.group_id, dep.artifact_id, dep.version
                );
                stats.skipped += 1;
                continue;
            }

            let mut record = MergedRecord::new(dep.group_id, dep.artifact_id, dep.version);
            record.scope = dep.scope;
            record.last_updated_date = dep.last_updated_date;
            record.relocations = dep.relocations.unwrap_or_default();

            debug!("New record {} from relocation data", record.coordinate());
            self.records.push(record);
            stats.inserted += 1;
        }

        stats
    }

    /// Merge update suggestions from one Renovate file.
    ///
    /// A matching record has its `new_versions` replaced wholesale, so the
    /// last file processed for a coordinate wins. Entries without any update
    /// candidate are ignored.
    pub fn merge_updates(&mut self, entries: Vec<RenovateDependency>) -> PassStats {
        let mut stats = PassStats::default();

        for entry in entries {
            if entry.updates.is_empty() {
                stats.skipped += 1;
                continue;
            }

            if !entry.has_artifact() {
                warn!(
                    "Dependency name '{}' has no group:artifact separator; using it as the group",
                    entry.dep_name
                );
            }
            let (group_id, artifact_id) = entry.coordinates();

            let new_versions = entry.update_infos();
            if new_versions.is_empty() {
                warn!(
                    "{}: none of {} update(s) is in the major or non-major bucket",
                    entry.dep_name,
                    entry.updates.len()
                );
            }

            match self.find(group_id, artifact_id, &entry.current_value) {
                Some(index) => {
                    let record = &mut self.records[index];
                    debug!(
                        "{}: {} update candidates",
                        record.coordinate(),
                        new_versions.len()
                    );
                    record.new_versions = new_versions;
                    stats.merged += 1;
                }
                None => {
                    let mut record =
                        MergedRecord::new(group_id, artifact_id, entry.current_value.as_str());
                    record.new_versions = new_versions;
                    debug!(
                        "New record {} with {} update candidates",
                        record.coordinate(),
                        record.new_versions.len()
                    );
                    self.records.push(record);
                    stats.inserted += 1;
                }
            }
        }

        stats
    }

    /// Merge a Dependency-Track vulnerability export.
    pub fn merge_vulnerabilities(&mut self, findings: Vec<VulnerabilityFinding>) -> PassStats {
        let mut stats = PassStats::default();

        for finding in findings {
            let component = finding.component;

            match self.find(&component.group, &component.name, &component.version) {
                Some(index) => {
                    self.records[index].vulnerabilities.push(finding.vulnerability);
                    stats.merged += 1;
                }
                None => {
                    debug!(
                        "Vulnerability {} for unknown component {}:{}:{}",
                        finding.vulnerability.vuln_id,
                        component.group,
                        component.name,
                        component.version
                    );
                    let mut record =
                        MergedRecord::new(component.group, component.name, component.version);
                    record.vulnerabilities.push(finding.vulnerability);
                    self.records.push(record);
                    stats.inserted += 1;
                }
            }
        }

        stats
    }

    /// Merge a Dependency-Track policy-violation export.
    ///
    /// Matching ignores the version: a violation attaches to the first record
    /// for the package in insertion order, even when several versions of
    /// that package are present.
    pub fn merge_policy_violations(
        &mut self,
        findings: Vec<PolicyViolationFinding>,
    ) -> PassStats {
        let mut stats = PassStats::default();

        for finding in findings {
            let violation = finding.to_violation();
            let component = finding.component;

            match self.find_package(&component.group, &component.name) {
                Some(index) => {
                    self.records[index]
                        .policy_violations
                        .get_or_insert_with(Vec::new)
                        .push(violation);
                    stats.merged += 1;
                }
                None => {
                    let mut record =
                        MergedRecord::new(component.group, component.name, component.version);
                    record.policy_violations = Some(vec![violation]);
                    self.records.push(record);
                    stats.inserted += 1;
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UpdateInfo, Vulnerability};
    use serde_json::{json, Value};

    fn relocation(group: &str, artifact: &str, version: &str, scope: &str) -> RelocatedDependency {
        serde_json::from_value(json!({
            "groupId": group,
            "artifactId": artifact,
            "version": version,
            "scope": scope,
            "lastUpdatedDate": "2024-01-01",
        }))
        .unwrap()
    }

    fn renovate(name: &str, current: &str, updates: Value) -> RenovateDependency {
        serde_json::from_value(json!({
            "depName": name,
            "currentValue": current,
            "updates": updates,
        }))
        .unwrap()
    }

    fn vulnerability(group: &str, name: &str, version: &str, id: &str) -> VulnerabilityFinding {
        serde_json::from_value(json!({
            "component": { "group": group, "name": name, "version": version },
            "vulnerability": { "vulnId": id, "severity": "HIGH", "epssScore": 0.1 }
        }))
        .unwrap()
    }

    fn violation(group: &str, name: &str, version: &str, policy: &str) -> PolicyViolationFinding {
        serde_json::from_value(json!({
            "component": { "uuid": "uuid-1", "group": group, "name": name, "version": version },
            "violationState": "FAIL",
            "type": "LICENSE",
            "policyName": policy
        }))
        .unwrap()
    }

    #[test]
    fn test_relocations_first_write_wins() {
        let mut aggregator = ReportAggregator::new();

        let first = aggregator.merge_relocations(vec![relocation("a", "b", "1.0", "compile")]);
        let second = aggregator.merge_relocations(vec![relocation("a", "b", "1.0", "test")]);

        assert_eq!(first.inserted, 1);
        assert_eq!(second.skipped, 1);
        assert_eq!(aggregator.records().len(), 1);
        assert_eq!(aggregator.records()[0].scope, "compile");
    }

    #[test]
    fn test_relocations_default_to_empty() {
        let mut aggregator = ReportAggregator::new();
        aggregator.merge_relocations(vec![relocation("a", "b", "1.0", "compile")]);

        let record = &aggregator.records()[0];
        assert!(record.relocations.is_empty());
        assert!(record.new_versions.is_empty());
        assert!(record.vulnerabilities.is_empty());
        assert!(record.policy_violations.is_none());
    }

    #[test]
    fn test_relocations_distinct_versions_are_kept() {
        let mut aggregator = ReportAggregator::new();
        aggregator.merge_relocations(vec![
            relocation("a", "b", "1.0", "compile"),
            relocation("a", "b", "2.0", "compile"),
        ]);

        assert_eq!(aggregator.records().len(), 2);
    }

    #[test]
    fn test_updates_last_write_wins() {
        let mut aggregator = ReportAggregator::new();
        aggregator.merge_relocations(vec![relocation("a", "b", "1.0", "compile")]);

        aggregator.merge_updates(vec![renovate(
            "a:b",
            "1.0",
            json!([{ "bucket": "non-major", "newVersion": "1.1", "updateType": "minor" }]),
        )]);
        let stats = aggregator.merge_updates(vec![renovate(
            "a:b",
            "1.0",
            json!([{ "bucket": "major", "newVersion": "2.0", "updateType": "major" }]),
        )]);

        assert_eq!(stats.merged, 1);
        assert_eq!(
            aggregator.records()[0].new_versions,
            vec![UpdateInfo {
                major: String::new(),
                non_major: "2.0".to_string(),
                update_type: "major".to_string(),
            }]
        );
    }

    #[test]
    fn test_updates_unmatched_creates_record() {
        let mut aggregator = ReportAggregator::new();
        let stats = aggregator.merge_updates(vec![renovate(
            "x:y",
            "3.0",
            json!([{ "bucket": "non-major", "newVersion": "3.1", "updateType": "patch" }]),
        )]);

        assert_eq!(stats.inserted, 1);
        let record = &aggregator.records()[0];
        assert_eq!(record.coordinate(), "x:y:3.0");
        assert_eq!(record.scope, "");
        assert_eq!(record.last_updated_date, "");
        assert_eq!(record.new_versions.len(), 1);
    }

    #[test]
    fn test_updates_without_candidates_are_skipped() {
        let mut aggregator = ReportAggregator::new();
        let stats = aggregator.merge_updates(vec![renovate("x:y", "3.0", json!([]))]);

        assert_eq!(stats.skipped, 1);
        assert!(aggregator.records().is_empty());
    }

    #[test]
    fn test_updates_outside_buckets_clear_candidates() {
        let mut aggregator = ReportAggregator::new();
        aggregator.merge_updates(vec![renovate(
            "a:b",
            "1.0",
            json!([{ "bucket": "non-major", "newVersion": "1.1", "updateType": "minor" }]),
        )]);
        aggregator.merge_updates(vec![renovate(
            "a:b",
            "1.0",
            json!([{ "bucket": "digest", "newVersion": "abc", "updateType": "digest" }]),
        )]);

        assert_eq!(aggregator.records().len(), 1);
        assert!(aggregator.records()[0].new_versions.is_empty());
    }

    #[test]
    fn test_updates_plugin_id_without_artifact_is_kept() {
        let mut aggregator = ReportAggregator::new();
        let stats = aggregator.merge_updates(vec![
            renovate(
                "org.springframework.boot",
                "3.1.0",
                json!([{ "bucket": "non-major", "newVersion": "3.2.0", "updateType": "minor" }]),
            ),
            renovate(
                "a:b",
                "1.0",
                json!([{ "bucket": "non-major", "newVersion": "1.1", "updateType": "minor" }]),
            ),
        ]);

        assert_eq!(stats.inserted, 2);
        let plugin = &aggregator.records()[0];
        assert_eq!(plugin.group_id, "org.springframework.boot");
        assert_eq!(plugin.artifact_id, "");
        assert_eq!(plugin.version, "3.1.0");
        assert_eq!(plugin.new_versions[0].non_major, "3.2.0");
        assert_eq!(aggregator.records()[1].coordinate(), "a:b:1.0");
    }

    #[test]
    fn test_vulnerability_preserves_relocation_fields() {
        let mut aggregator = ReportAggregator::new();
        let mut dep = relocation("a", "b", "1.0", "runtime");
        dep.relocations = Some(vec![json!({ "groupId": "new.a", "artifactId": "b" })]);
        aggregator.merge_relocations(vec![dep]);

        let stats = aggregator.merge_vulnerabilities(vec![
            vulnerability("a", "b", "1.0", "CVE-1"),
            vulnerability("a", "b", "1.0", "CVE-2"),
        ]);

        assert_eq!(stats.merged, 2);
        let record = &aggregator.records()[0];
        assert_eq!(record.scope, "runtime");
        assert_eq!(record.last_updated_date, "2024-01-01");
        assert_eq!(record.relocations.len(), 1);
        let ids: Vec<_> = record.vulnerabilities.iter().map(|v| v.vuln_id.as_str()).collect();
        assert_eq!(ids, vec!["CVE-1", "CVE-2"]);
    }

    #[test]
    fn test_unmatched_vulnerability_creates_standalone_record() {
        let mut aggregator = ReportAggregator::new();
        aggregator.merge_relocations(vec![relocation("a", "b", "1.0", "compile")]);

        let stats = aggregator.merge_vulnerabilities(vec![vulnerability("a", "b", "2.0", "CVE-9")]);

        assert_eq!(stats.inserted, 1);
        let record = &aggregator.records()[1];
        assert_eq!(record.coordinate(), "a:b:2.0");
        assert_eq!(
            record.vulnerabilities,
            vec![Vulnerability {
                vuln_id: "CVE-9".to_string(),
                description: None,
                severity: Some("HIGH".to_string()),
                epss_score: Some(0.1),
            }]
        );
        assert!(record.new_versions.is_empty());
        assert!(record.relocations.is_empty());
        assert!(record.policy_violations.is_none());
    }

    #[test]
    fn test_policy_violation_matches_without_version() {
        let mut aggregator = ReportAggregator::new();
        aggregator.merge_relocations(vec![
            relocation("a", "b", "1.0", "compile"),
            relocation("a", "b", "2.0", "compile"),
        ]);

        let stats = aggregator.merge_policy_violations(vec![violation("a", "b", "2.0", "No GPL")]);

        // Version is not part of the key, so the violation for 2.0 lands on
        // whichever record for a:b comes first.
        assert_eq!(stats.merged, 1);
        let with_violations: Vec<_> = aggregator
            .records()
            .iter()
            .filter(|r| r.policy_violations.is_some())
            .collect();
        assert_eq!(with_violations.len(), 1);
        assert_eq!(with_violations[0].version, "1.0");
        assert!(aggregator.records()[1].policy_violations.is_none());
    }

    #[test]
    fn test_policy_violations_append() {
        let mut aggregator = ReportAggregator::new();
        aggregator.merge_relocations(vec![relocation("a", "b", "1.0", "compile")]);

        aggregator.merge_policy_violations(vec![
            violation("a", "b", "1.0", "No GPL"),
            violation("a", "b", "1.0", "No AGPL"),
        ]);

        let violations = aggregator.records()[0].policy_violations.as_ref().unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].policy_name, "No AGPL");
    }

    #[test]
    fn test_unmatched_policy_violation_creates_record() {
        let mut aggregator = ReportAggregator::new();
        let stats = aggregator.merge_policy_violations(vec![violation("x", "y", "1.0", "No GPL")]);

        assert_eq!(stats.inserted, 1);
        let record = &aggregator.records()[0];
        assert_eq!(record.coordinate(), "x:y:1.0");
        assert!(record.vulnerabilities.is_empty());
        assert_eq!(record.policy_violations.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_pass_stats_accumulate() {
        let mut total = PassStats::default();
        total += PassStats { inserted: 1, merged: 2, skipped: 3 };
        total += PassStats { inserted: 1, merged: 0, skipped: 1 };

        assert_eq!(total, PassStats { inserted: 2, merged: 2, skipped: 4 });
    }
}
