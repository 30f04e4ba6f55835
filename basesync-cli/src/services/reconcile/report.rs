//! Report builder for schema synchronization runs
//!
//! A report is derived purely from the change log: it never lists anything
//! that was not applied. Field failures go in their own section and are not
//! counted as changes.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::change::{ChangeKind, ChangeRecord};
use super::context::RunMetrics;
use super::error::SyncError;

const RULE_WIDTH: usize = 50;

/// Changes of one kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeGroup {
    pub kind: ChangeKind,
    pub count: usize,
    pub entries: Vec<String>,
}

/// Human-readable and exportable summary of a run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,
    pub groups: Vec<ChangeGroup>,
    pub total_changes: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RunMetrics>,
}

/// Build a report from a change log, grouping by kind in order of first appearance
pub fn generate_report(changes: &[ChangeRecord]) -> SyncReport {
    let mut groups: Vec<ChangeGroup> = Vec::new();

    for change in changes {
        let kind = change.kind();
        let idx = match groups.iter().position(|g| g.kind == kind) {
            Some(idx) => idx,
            None => {
                groups.push(ChangeGroup {
                    kind,
                    count: 0,
                    entries: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[idx].count += 1;
        groups[idx].entries.push(change.summary());
    }

    SyncReport {
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        base_id: None,
        groups,
        total_changes: changes.len(),
        failures: Vec::new(),
        metrics: None,
    }
}

impl SyncReport {
    pub fn with_base_id(mut self, base_id: impl Into<String>) -> Self {
        self.base_id = Some(base_id.into());
        self
    }

    pub fn with_failures(mut self, failures: &[SyncError]) -> Self {
        self.failures = failures.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_metrics(mut self, metrics: RunMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Render the report as text, passing each section heading through `label`.
    ///
    /// `label` receives the kind of the section (`None` for the failures
    /// section) and the plain heading, and returns the text to print.
    pub fn render<F>(&self, label: F) -> String
    where
        F: Fn(Option<ChangeKind>, &str) -> String,
    {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec!["Schema Sync Report".to_string(), rule.clone()];
        if let Some(base_id) = &self.base_id {
            lines.push(format!("Base: {}", base_id));
        }
        lines.push(format!("Generated: {}", self.generated_at));

        for group in &self.groups {
            lines.push(String::new());
            let heading = format!("{}: {}", group.kind, group.count);
            lines.push(label(Some(group.kind), &heading));
            lines.extend(group.entries.iter().map(|e| format!("  - {}", e)));
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            let heading = format!("NOT APPLIED: {}", self.failures.len());
            lines.push(label(None, &heading));
            lines.extend(self.failures.iter().map(|e| format!("  - {}", e)));
        }

        lines.push(String::new());
        lines.push(rule);
        lines.push(format!("Total changes: {}", self.total_changes));
        lines.join("\n")
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, heading| heading.to_string()))
    }
}

/// Export a sync report to a JSON file
pub fn export_report_to_json(report: &SyncReport, file_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize sync report")?;
    std::fs::write(file_path, json)
        .with_context(|| format!("Failed to write report file: {}", file_path.display()))?;

    log::info!("Sync report exported to: {}", file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StoreError;

    fn table_created(name: &str) -> ChangeRecord {
        ChangeRecord::TableCreated {
            table_id: format!("tbl{}", name),
            table_name: name.to_string(),
        }
    }

    fn field_added(table: &str, field: &str) -> ChangeRecord {
        ChangeRecord::FieldAdded {
            table_id: format!("tbl{}", table),
            table_name: table.to_string(),
            field_id: format!("fld{}", field),
            field_name: field.to_string(),
            field_type: "singleLineText".to_string(),
        }
    }

    fn sample_changes() -> Vec<ChangeRecord> {
        vec![
            table_created("Invoices"),
            table_created("Contacts"),
            field_added("Accounts", "Email"),
            field_added("Accounts", "Phone"),
            field_added("Deals", "Stage"),
        ]
    }

    #[test]
    fn test_counts_per_kind() {
        let report = generate_report(&sample_changes());

        let counts: Vec<_> = report.groups.iter().map(|g| (g.kind, g.count)).collect();
        assert_eq!(
            counts,
            vec![(ChangeKind::TableCreated, 2), (ChangeKind::FieldAdded, 3)]
        );
        assert_eq!(report.total_changes, 5);
    }

    #[test]
    fn test_empty_change_log() {
        let report = generate_report(&[]);

        assert!(report.groups.is_empty());
        assert_eq!(report.total_changes, 0);
        assert!(report.to_string().ends_with("Total changes: 0"));
    }

    #[test]
    fn test_rendering() {
        let report = generate_report(&sample_changes()).with_base_id("app1");
        let text = report.to_string();

        assert!(text.starts_with("Schema Sync Report\n"));
        assert!(text.contains("Base: app1"));
        assert!(text.contains("TABLE_CREATED: 2\n  - Invoices\n  - Contacts"));
        assert!(text.contains("FIELD_ADDED: 3\n  - Accounts.Email (singleLineText)"));
        assert!(text.ends_with("Total changes: 5"));
        assert!(!text.contains("NOT APPLIED"));
    }

    #[test]
    fn test_render_only_restyles_headings() {
        let report = generate_report(&sample_changes()).with_base_id("app1");

        let styled = report.render(|kind, heading| match kind {
            Some(kind) => format!("<{}>{}</>", kind, heading),
            None => format!("<failed>{}</>", heading),
        });

        assert!(styled.contains("<TABLE_CREATED>TABLE_CREATED: 2</>\n  - Invoices"));
        assert!(styled.contains("<FIELD_ADDED>FIELD_ADDED: 3</>"));
        let unstyled = styled
            .replace("<TABLE_CREATED>", "")
            .replace("<FIELD_ADDED>", "")
            .replace("</>", "");
        assert_eq!(unstyled, report.to_string());
    }

    #[test]
    fn test_failures_are_not_counted() {
        let failure = SyncError::FieldApplicationFailed {
            table: "Accounts".to_string(),
            field: "Fax".to_string(),
            field_type: "phoneNumber".to_string(),
            source: StoreError::Rejected {
                endpoint: "POST /bases/app1/tables/tblAccounts/fields".to_string(),
                status: 422,
                body: "INVALID_FIELD_TYPE".to_string(),
            },
        };

        let report = generate_report(&[field_added("Accounts", "Email")]).with_failures(&[failure]);

        assert_eq!(report.total_changes, 1);
        assert_eq!(report.failures.len(), 1);
        let text = report.to_string();
        assert!(text.contains("NOT APPLIED: 1\n  - failed to add field 'Fax'"));
    }

    #[test]
    fn test_export_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut metrics = RunMetrics::default();
        metrics.record("create_table", true, std::time::Duration::from_millis(10));

        let report = generate_report(&sample_changes())
            .with_base_id("app1")
            .with_metrics(metrics);
        export_report_to_json(&report, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["baseId"], "app1");
        assert_eq!(value["totalChanges"], 5);
        assert_eq!(value["groups"][0]["kind"], "TABLE_CREATED");
        assert_eq!(value["groups"][1]["count"], 3);
        assert_eq!(value["metrics"]["operations"]["create_table"]["attempts"], 1);
        assert!(value.get("failures").is_none());
    }
}
