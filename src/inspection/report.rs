//! The unified inspection report.
//!
//! Built once per acquisition from the `(sub-job, report)` pairs of either
//! acquisition path. The flat issue list is derived when the report is
//! built and nothing mutates the pairs afterwards.

use crate::config::SubJobConfig;
use crate::models::{Issue, Report};
use crate::sonar::component_path;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// A report together with the sub-job it was read for.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInfo {
    pub config: SubJobConfig,
    pub report: Report,
    /// Auto-match flag handed to this report's issues.
    pub auto_match: bool,
}

impl ReportInfo {
    pub fn new(config: SubJobConfig, report: Report) -> Self {
        let auto_match = config.auto_match;
        Self {
            config,
            report,
            auto_match,
        }
    }

    /// Override the auto-match flag without touching the sub-job key.
    pub fn with_auto_match(mut self, auto_match: bool) -> Self {
        self.auto_match = auto_match;
        self
    }
}

/// An issue located in the repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionIssue {
    #[serde(flatten)]
    pub issue: Issue,
    /// Path relative to the repository root.
    pub file_path: String,
    /// Inherited from the owning sub-job.
    pub auto_match: bool,
}

impl InspectionIssue {
    fn locate(info: &ReportInfo, issue: &Issue) -> Self {
        let (config, report) = (&info.config, &info.report);
        let module_path = report
            .component(&issue.component)
            .and_then(|c| c.path.as_deref())
            .or_else(|| component_path(&issue.component))
            .unwrap_or(issue.component.as_str());

        let project_path = config.project_path.trim().trim_end_matches('/');
        let file_path = if project_path.is_empty() {
            module_path.to_string()
        } else {
            format!("{}/{}", project_path, module_path.trim_start_matches('/'))
        };

        Self {
            issue: issue.clone(),
            file_path,
            auto_match: info.auto_match,
        }
    }
}

/// Aggregate of every report acquired in one run.
#[derive(Debug, Clone, Default)]
pub struct InspectionReport {
    reports: Vec<ReportInfo>,
    issues: Vec<InspectionIssue>,
}

impl InspectionReport {
    pub fn new(reports: Vec<ReportInfo>) -> Self {
        let issues = reports
            .iter()
            .flat_map(|info| {
                info.report
                    .issues
                    .iter()
                    .map(move |issue| InspectionIssue::locate(info, issue))
            })
            .collect();

        Self { reports, issues }
    }

    /// Every issue of every report, in report order then issue order.
    pub fn flat_issues(&self) -> &[InspectionIssue] {
        &self.issues
    }

    /// The acquired reports in acquisition order.
    pub fn report_infos(&self) -> &[ReportInfo] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Group items by a key, keeping input order within each key.
    pub fn as_multimap<T, K, I, F>(issues: I, key_fn: F) -> HashMap<K, Vec<T>>
    where
        I: IntoIterator<Item = T>,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut grouped: HashMap<K, Vec<T>> = HashMap::new();

        for issue in issues {
            grouped.entry(key_fn(&issue)).or_default().push(issue);
        }

        grouped
    }

    /// All issues keyed by repository file path.
    pub fn report_data(&self) -> HashMap<String, Vec<&InspectionIssue>> {
        Self::as_multimap(self.issues.iter(), |i| i.file_path.clone())
    }

    /// The report read for a sub-job, matched by value.
    pub fn raw_report(&self, config: &SubJobConfig) -> Option<&Report> {
        self.reports
            .iter()
            .find(|info| &info.config == config)
            .map(|info| &info.report)
    }
}
