//! Summary output for an acquired inspection.
//!
//! Renders the aggregate as Markdown for people or JSON for the review
//! tooling that consumes it.

use crate::inspection::{InspectionIssue, InspectionReport};
use crate::models::Severity;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Issue counts of an inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub total: usize,
    pub new_issues: usize,
    pub blocker: usize,
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
    pub info: usize,
    /// Issue count per rule.
    pub by_rule: BTreeMap<String, usize>,
}

impl IssueSummary {
    pub fn from_issues(issues: &[InspectionIssue]) -> Self {
        let mut summary = Self {
            total: issues.len(),
            ..Self::default()
        };

        for entry in issues {
            match entry.issue.severity {
                Severity::Blocker => summary.blocker += 1,
                Severity::Critical => summary.critical += 1,
                Severity::Major => summary.major += 1,
                Severity::Minor => summary.minor += 1,
                Severity::Info => summary.info += 1,
            }
            if entry.issue.is_new {
                summary.new_issues += 1;
            }
            *summary.by_rule.entry(entry.issue.rule.clone()).or_insert(0) += 1;
        }

        summary
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    generated_at: DateTime<Utc>,
    reports: usize,
    summary: IssueSummary,
    files: BTreeMap<String, Vec<&'a InspectionIssue>>,
}

/// Issues grouped by file, files sorted by path, issues by line.
fn issues_by_file(report: &InspectionReport) -> BTreeMap<String, Vec<&InspectionIssue>> {
    report
        .report_data()
        .into_iter()
        .map(|(path, mut issues)| {
            issues.sort_by_key(|i| i.issue.line.unwrap_or(0));
            (path, issues)
        })
        .collect()
}

/// Generate a Markdown summary.
pub fn generate_markdown_summary(report: &InspectionReport) -> String {
    let summary = IssueSummary::from_issues(report.flat_issues());
    let mut output = String::new();

    output.push_str("# SonarQube Inspection\n\n");
    output.push_str(&format!("- **Reports:** {}\n", report.len()));
    output.push_str(&format!("- **Total Issues:** {}\n", summary.total));
    output.push_str(&format!("- **New Issues:** {}\n\n", summary.new_issues));

    output.push_str(&generate_severity_table(&summary));
    output.push_str(&generate_issues_section(report));

    output
}

fn generate_severity_table(summary: &IssueSummary) -> String {
    let mut section = String::new();

    section.push_str("## Severity Breakdown\n\n");
    section.push_str(&format!(
        "| {} Blocker | {} Critical | {} Major | {} Minor | {} Info | **Total** |\n",
        Severity::Blocker.emoji(),
        Severity::Critical.emoji(),
        Severity::Major.emoji(),
        Severity::Minor.emoji(),
        Severity::Info.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} | **{}** |\n\n",
        summary.blocker, summary.critical, summary.major, summary.minor, summary.info, summary.total
    ));

    if !summary.by_rule.is_empty() {
        section.push_str("### Issues by Rule\n\n");
        section.push_str("| Rule | Count |\n");
        section.push_str("|:---|:---:|\n");

        let mut rules: Vec<_> = summary.by_rule.iter().collect();
        rules.sort_by_key(|(_, count)| std::cmp::Reverse(**count));

        for (rule, count) in rules {
            section.push_str(&format!("| `{}` | {} |\n", rule, count));
        }
        section.push('\n');
    }

    section
}

fn generate_issues_section(report: &InspectionReport) -> String {
    let mut section = String::new();

    section.push_str("## Issues by File\n\n");

    let files = issues_by_file(report);
    if files.is_empty() {
        section.push_str("No issues reported.\n\n");
        return section;
    }

    for (path, issues) in files {
        section.push_str(&format!("### `{}`\n\n", path));
        for entry in issues {
            let line = entry
                .issue
                .line
                .map(|l| format!("L{}", l))
                .unwrap_or_else(|| "file".to_string());
            section.push_str(&format!(
                "- {} **{}** {} `{}`: {}{}\n",
                entry.issue.severity.emoji(),
                entry.issue.severity,
                line,
                entry.issue.rule,
                entry.issue.message,
                if entry.issue.is_new { " *(new)*" } else { "" }
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate a JSON summary.
pub fn generate_json_summary(report: &InspectionReport) -> Result<String> {
    let output = JsonSummary {
        generated_at: Utc::now(),
        reports: report.len(),
        summary: IssueSummary::from_issues(report.flat_issues()),
        files: issues_by_file(report),
    };
    serde_json::to_string_pretty(&output).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubJobConfig;
    use crate::inspection::ReportInfo;
    use crate::models::{Issue, Report};

    fn issue(key: &str, path: &str, line: u32, severity: Severity, is_new: bool) -> Issue {
        Issue {
            key: key.to_string(),
            component: format!("com.acme:foo:{}", path),
            line: Some(line),
            message: format!("Message {}", key),
            severity,
            rule: "java:S1481".to_string(),
            status: "OPEN".to_string(),
            is_new,
            creation_date: None,
        }
    }

    fn create_test_report() -> InspectionReport {
        InspectionReport::new(vec![ReportInfo::new(
            SubJobConfig::default(),
            Report::new(
                None,
                vec![
                    issue("A", "src/Foo.java", 20, Severity::Major, true),
                    issue("B", "src/Foo.java", 3, Severity::Blocker, false),
                    issue("C", "src/Bar.java", 7, Severity::Info, true),
                ],
                vec![],
            ),
        )])
    }

    #[test]
    fn test_issue_summary() {
        let report = create_test_report();
        let summary = IssueSummary::from_issues(report.flat_issues());

        assert_eq!(summary.total, 3);
        assert_eq!(summary.new_issues, 2);
        assert_eq!(summary.blocker, 1);
        assert_eq!(summary.major, 1);
        assert_eq!(summary.info, 1);
        assert_eq!(summary.by_rule.get("java:S1481"), Some(&3));
    }

    #[test]
    fn test_generate_markdown_summary() {
        let markdown = generate_markdown_summary(&create_test_report());

        assert!(markdown.contains("# SonarQube Inspection"));
        assert!(markdown.contains("## Severity Breakdown"));
        assert!(markdown.contains("### `src/Foo.java`"));
        assert!(markdown.contains("Message A *(new)*"));

        let blocker = markdown.find("Message B").unwrap();
        let major = markdown.find("Message A").unwrap();
        assert!(blocker < major, "issues within a file are ordered by line");
    }

    #[test]
    fn test_generate_markdown_summary_empty() {
        let markdown = generate_markdown_summary(&InspectionReport::new(vec![]));
        assert!(markdown.contains("No issues reported."));
    }

    #[test]
    fn test_generate_json_summary() {
        let json = generate_json_summary(&create_test_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["reports"], 1);
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["files"]["src/Bar.java"][0]["key"], "C");
        assert_eq!(value["files"]["src/Foo.java"][0]["severity"], "BLOCKER");
    }
}
