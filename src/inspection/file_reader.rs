//! File-mode acquisition: one report artifact per sub-job.

use crate::config::SubJobConfig;
use crate::error::{InspectionError, MissingReason, Result};
use crate::inspection::report::ReportInfo;
use crate::inspection::workspace::{PathKind, Workspace};
use crate::models::Report;
use crate::report::parse_report;
use tracing::{error, info};

/// Reads the reports written by the build into the workspace.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReportReader;

impl FileReportReader {
    /// Read every sub-job's report, in order.
    ///
    /// Stops at the first missing or unparsable report; a multi-module
    /// inspection is only usable when every module's report is present.
    pub fn read_all(
        &self,
        workspace: &dyn Workspace,
        sub_jobs: &[SubJobConfig],
    ) -> Result<Vec<ReportInfo>> {
        let mut reports = Vec::with_capacity(sub_jobs.len());

        for sub_job in sub_jobs {
            let report = self.read_report(workspace, &sub_job.sonar_report_path)?;
            reports.push(ReportInfo::new(sub_job.clone(), report));
        }

        Ok(reports)
    }

    fn read_report(&self, workspace: &dyn Workspace, report_path: &str) -> Result<Report> {
        let path = workspace.resolve(report_path);

        let reason = match workspace.probe(report_path)? {
            PathKind::File => None,
            PathKind::Missing => Some(MissingReason::NotFound),
            PathKind::Directory => Some(MissingReason::IsDirectory),
        };
        if let Some(reason) = reason {
            error!("SonarQube report {} {}", path.display(), reason);
            return Err(InspectionError::MissingReport { path, reason });
        }

        info!("Loading SonarQube report from {}", path.display());

        let json = workspace.read_to_string(report_path)?;
        let report = parse_report(&json).map_err(|source| {
            error!("Failed to parse {}: {}", path.display(), source);
            InspectionError::Parse {
                origin: path.display().to_string(),
                source,
            }
        })?;

        info!("Loaded {} issues", report.issue_count());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// In-memory workspace that records every path it is asked about.
    struct RecordingWorkspace {
        root: PathBuf,
        files: HashMap<String, String>,
        directories: Vec<String>,
        probed: Mutex<Vec<String>>,
    }

    impl RecordingWorkspace {
        fn new(files: &[(&str, &str)], directories: &[&str]) -> Self {
            Self {
                root: PathBuf::from("/ws"),
                files: files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
                directories: directories.iter().map(|d| d.to_string()).collect(),
                probed: Mutex::new(Vec::new()),
            }
        }

        fn probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    impl Workspace for RecordingWorkspace {
        fn root(&self) -> &Path {
            &self.root
        }

        fn probe(&self, relative: &str) -> Result<PathKind> {
            self.probed.lock().unwrap().push(relative.to_string());
            if self.files.contains_key(relative) {
                Ok(PathKind::File)
            } else if self.directories.iter().any(|d| d == relative) {
                Ok(PathKind::Directory)
            } else {
                Ok(PathKind::Missing)
            }
        }

        fn read_to_string(&self, relative: &str) -> Result<String> {
            Ok(self.files[relative].clone())
        }
    }

    fn report_with_issues(count: usize) -> String {
        let issues: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"key": "K{}", "component": "p:m:src/F{}.java", "line": {}, "message": "m", "severity": "MINOR", "rule": "r", "status": "OPEN"}}"#,
                    i, i, i + 1
                )
            })
            .collect();
        format!(r#"{{"issues": [{}], "components": []}}"#, issues.join(","))
    }

    fn sub_jobs(paths: &[&str]) -> Vec<SubJobConfig> {
        paths.iter().map(|p| SubJobConfig::new(*p, "")).collect()
    }

    #[test]
    fn test_reads_all_in_order() {
        let one = report_with_issues(1);
        let two = report_with_issues(2);
        let workspace = RecordingWorkspace::new(&[("a.json", one.as_str()), ("b.json", two.as_str())], &[]);

        let configs = sub_jobs(&["b.json", "a.json"]);
        let reports = FileReportReader.read_all(&workspace, &configs).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].config, configs[0]);
        assert_eq!(reports[0].report.issue_count(), 2);
        assert_eq!(reports[1].config, configs[1]);
        assert_eq!(reports[1].report.issue_count(), 1);
    }

    #[test]
    fn test_missing_report_stops_reading() {
        let body = report_with_issues(1);
        for missing_at in 0..3 {
            let mut paths = vec!["a.json", "b.json", "c.json"];
            paths[missing_at] = "missing.json";
            let files: Vec<(&str, &str)> = paths
                .iter()
                .filter(|p| **p != "missing.json")
                .map(|p| (*p, body.as_str()))
                .collect();
            let workspace = RecordingWorkspace::new(&files, &[]);

            let result = FileReportReader.read_all(&workspace, &sub_jobs(&paths));

            match result {
                Err(InspectionError::MissingReport { path, reason }) => {
                    assert_eq!(path, PathBuf::from("/ws/missing.json"));
                    assert_eq!(reason, MissingReason::NotFound);
                }
                other => panic!("unexpected result: {:?}", other),
            }
            let expected: Vec<String> = paths[..=missing_at].iter().map(|p| p.to_string()).collect();
            assert_eq!(workspace.probed(), expected);
        }
    }

    #[test]
    fn test_directory_is_missing_report() {
        let body = report_with_issues(1);
        let workspace = RecordingWorkspace::new(&[("b.json", body.as_str())], &["target/sonar"]);

        let result = FileReportReader.read_all(&workspace, &sub_jobs(&["target/sonar", "b.json"]));

        assert!(matches!(
            result,
            Err(InspectionError::MissingReport {
                reason: MissingReason::IsDirectory,
                ..
            })
        ));
        assert_eq!(workspace.probed(), vec!["target/sonar".to_string()]);
    }

    #[test]
    fn test_parse_failure_is_fatal() {
        let body = report_with_issues(1);
        let workspace = RecordingWorkspace::new(&[("a.json", "not json"), ("b.json", body.as_str())], &[]);

        let result = FileReportReader.read_all(&workspace, &sub_jobs(&["a.json", "b.json"]));

        assert!(matches!(result, Err(InspectionError::Parse { .. })));
        assert_eq!(workspace.probed(), vec!["a.json".to_string()]);
    }

    #[test]
    fn test_no_sub_jobs() {
        let workspace = RecordingWorkspace::new(&[], &[]);
        assert!(FileReportReader.read_all(&workspace, &[]).unwrap().is_empty());
    }
}
