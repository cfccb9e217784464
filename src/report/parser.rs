//! SonarQube JSON report parsing.
//!
//! Two shapes are accepted: the preview-mode report written to the
//! workspace by the scanner, and a page of the `/api/issues/search` web API.
//! Both normalize into [`Report`].

use crate::error::ParseError;
use crate::models::{Component, Issue, Report, Severity};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIssue {
    key: String,
    component: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    message: String,
    severity: String,
    #[serde(default)]
    rule: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    is_new: Option<bool>,
    #[serde(default)]
    creation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComponent {
    key: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    module_key: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Preview-mode report (`sonar-report.json`).
#[derive(Debug, Deserialize)]
struct RawReport {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    issues: Vec<RawIssue>,
    #[serde(default)]
    components: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPaging {
    page_index: usize,
    page_size: usize,
    total: usize,
}

/// One page of `/api/issues/search`.
#[derive(Debug, Deserialize)]
struct RawIssuePage {
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    p: Option<usize>,
    #[serde(default)]
    ps: Option<usize>,
    #[serde(default)]
    paging: Option<RawPaging>,
    #[serde(default)]
    issues: Vec<RawIssue>,
    #[serde(default)]
    components: Vec<RawComponent>,
}

/// A parsed page of issue search results.
#[derive(Debug, Clone)]
pub struct IssuePage {
    /// Total number of matching issues on the server.
    pub total: usize,
    /// 1-based page index.
    pub page_index: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Issues and components on this page.
    pub report: Report,
}

/// Parse a preview-mode report.
pub fn parse_report(json: &str) -> Result<Report, ParseError> {
    let raw: RawReport = serde_json::from_str(json)?;

    let issues = raw
        .issues
        .into_iter()
        .map(|i| convert_issue(i, false))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Report::new(
        raw.version,
        issues,
        raw.components.into_iter().map(convert_component).collect(),
    ))
}

/// Parse one page of the issue search API.
///
/// Issues returned for a pull request are new by definition, so a missing
/// `isNew` flag defaults to `true` here.
pub fn parse_issue_page(json: &str) -> Result<IssuePage, ParseError> {
    let raw: RawIssuePage = serde_json::from_str(json)?;

    let issue_count = raw.issues.len();
    let (total, page_index, page_size) = match raw.paging {
        Some(paging) => (paging.total, paging.page_index, paging.page_size),
        None => (
            raw.total.unwrap_or(issue_count),
            raw.p.unwrap_or(1),
            raw.ps.unwrap_or(issue_count),
        ),
    };

    let issues = raw
        .issues
        .into_iter()
        .map(|i| convert_issue(i, true))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IssuePage {
        total,
        page_index,
        page_size,
        report: Report::new(
            None,
            issues,
            raw.components.into_iter().map(convert_component).collect(),
        ),
    })
}

fn convert_issue(raw: RawIssue, default_new: bool) -> Result<Issue, ParseError> {
    let severity = Severity::parse(&raw.severity).ok_or_else(|| ParseError::UnknownSeverity {
        key: raw.key.clone(),
        severity: raw.severity.clone(),
    })?;

    let creation_date = match raw.creation_date.as_deref() {
        Some(value) => Some(parse_date(value).ok_or_else(|| ParseError::InvalidDate {
            key: raw.key.clone(),
            value: value.to_string(),
        })?),
        None => None,
    };

    Ok(Issue {
        key: raw.key,
        component: raw.component,
        line: raw.line,
        message: raw.message,
        severity,
        rule: raw.rule,
        status: raw.status,
        is_new: raw.is_new.unwrap_or(default_new),
        creation_date,
    })
}

fn convert_component(raw: RawComponent) -> Component {
    Component {
        key: raw.key,
        path: raw.path,
        module_key: raw.module_key,
        status: raw.status,
    }
}

/// SonarQube writes offsets without a colon (`+0000`), which RFC 3339 rejects.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREVIEW_REPORT: &str = r#"{
        "version": "5.6.1",
        "issues": [
            {
                "key": "AV-1",
                "component": "com.acme:foo:src/main/java/Foo.java",
                "line": 12,
                "message": "Remove this unused import.",
                "severity": "MINOR",
                "rule": "squid:UselessImportCheck",
                "status": "OPEN",
                "isNew": true,
                "creationDate": "2017-11-28T14:42:00+0000"
            },
            {
                "key": "AV-2",
                "component": "com.acme:foo:src/main/java/Bar.java",
                "message": "File is too long.",
                "severity": "MAJOR",
                "rule": "squid:S00104",
                "status": "OPEN",
                "isNew": false
            }
        ],
        "components": [
            {
                "key": "com.acme:foo:src/main/java/Foo.java",
                "path": "src/main/java/Foo.java",
                "moduleKey": "com.acme:foo",
                "status": "CHANGED"
            }
        ],
        "rules": [],
        "users": []
    }"#;

    #[test]
    fn test_parse_preview_report() {
        let report = parse_report(PREVIEW_REPORT).unwrap();

        assert_eq!(report.version.as_deref(), Some("5.6.1"));
        assert_eq!(report.issue_count(), 2);

        let first = &report.issues[0];
        assert_eq!(first.line, Some(12));
        assert_eq!(first.severity, Severity::Minor);
        assert!(first.is_new);
        assert_eq!(
            first.creation_date.map(|d| d.to_rfc3339()),
            Some("2017-11-28T14:42:00+00:00".to_string())
        );

        let second = &report.issues[1];
        assert_eq!(second.line, None);
        assert!(!second.is_new);
        assert!(second.creation_date.is_none());

        assert_eq!(report.components.len(), 1);
        assert_eq!(
            report.components[0].module_key.as_deref(),
            Some("com.acme:foo")
        );
    }

    #[test]
    fn test_parse_empty_report() {
        let report = parse_report("{}").unwrap();
        assert_eq!(report.issue_count(), 0);
        assert!(report.components.is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_report("{ not json"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_parse_unknown_severity() {
        let json = r#"{"issues": [{"key": "X", "component": "c", "severity": "URGENT"}]}"#;
        match parse_report(json) {
            Err(ParseError::UnknownSeverity { key, severity }) => {
                assert_eq!(key, "X");
                assert_eq!(severity, "URGENT");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_date() {
        let json = r#"{"issues": [{"key": "X", "component": "c", "severity": "INFO", "creationDate": "yesterday"}]}"#;
        assert!(matches!(
            parse_report(json),
            Err(ParseError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_parse_issue_page_with_paging() {
        let json = r#"{
            "paging": {"pageIndex": 2, "pageSize": 500, "total": 501},
            "issues": [
                {
                    "key": "AX-9",
                    "component": "com.acme:foo:src/Foo.java",
                    "line": 3,
                    "message": "Null pointer dereference",
                    "severity": "CRITICAL",
                    "rule": "java:S2259",
                    "status": "OPEN",
                    "creationDate": "2024-05-01T10:00:00+0200"
                }
            ],
            "components": [
                {"key": "com.acme:foo:src/Foo.java", "path": "src/Foo.java"}
            ]
        }"#;

        let page = parse_issue_page(json).unwrap();
        assert_eq!(page.total, 501);
        assert_eq!(page.page_index, 2);
        assert_eq!(page.page_size, 500);
        assert_eq!(page.report.issue_count(), 1);
        assert!(page.report.issues[0].is_new);
        assert_eq!(page.report.issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_parse_issue_page_legacy_fields() {
        let json = r#"{"total": 0, "p": 1, "ps": 100, "issues": [], "components": []}"#;
        let page = parse_issue_page(json).unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.page_size, 100);
    }
}
