//! Report acquisition entry point.
//!
//! `SonarConnector` picks the acquisition path from the configured analysis
//! type, runs it and keeps the resulting [`InspectionReport`] for the rest
//! of the run.

use crate::config::{AnalysisType, InspectionConfig, RootModule, SubJobConfig};
use crate::error::Result;
use crate::inspection::file_reader::FileReportReader;
use crate::inspection::remote::RemoteReportFetcher;
use crate::inspection::report::{InspectionIssue, InspectionReport, ReportInfo};
use crate::inspection::workspace::Workspace;
use crate::models::Report;
use std::collections::HashMap;
use tracing::info;

/// Where the reports of one run come from.
pub enum ReportSource<'a> {
    File(FileReportReader),
    Remote(&'a RemoteReportFetcher),
}

impl<'a> ReportSource<'a> {
    pub fn select(analysis_type: AnalysisType, remote: &'a RemoteReportFetcher) -> Self {
        match analysis_type {
            AnalysisType::File => ReportSource::File(FileReportReader),
            AnalysisType::PullRequest => ReportSource::Remote(remote),
        }
    }

    pub async fn acquire(
        &self,
        workspace: &dyn Workspace,
        config: &InspectionConfig,
    ) -> Result<Vec<ReportInfo>> {
        match self {
            ReportSource::File(reader) => {
                reader.read_all(workspace, &config.all_sub_job_configs())
            }
            ReportSource::Remote(fetcher) => fetcher.fetch_one(workspace.root(), config).await,
        }
    }
}

/// Acquires SonarQube results for one run.
pub struct SonarConnector {
    config: InspectionConfig,
    root_module: Option<RootModule>,
    remote: RemoteReportFetcher,
    report: Option<InspectionReport>,
}

impl SonarConnector {
    pub fn new(config: InspectionConfig, remote: RemoteReportFetcher) -> Self {
        Self {
            config,
            root_module: None,
            remote,
            report: None,
        }
    }

    /// Root module of a multi-module build, used to derive a missing component.
    pub fn with_root_module(mut self, root_module: Option<RootModule>) -> Self {
        self.root_module = root_module;
        self
    }

    /// The inspection config, including any derived component.
    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }

    /// Acquire and aggregate the reports of this run.
    ///
    /// In pull-request mode a missing component is first derived from the
    /// root module and kept in the connector's config.
    pub async fn read_reports(&mut self, workspace: &dyn Workspace) -> Result<&InspectionReport> {
        if self.config.analysis_type == AnalysisType::PullRequest {
            let had_component = self.config.component().is_some();
            self.config = std::mem::take(&mut self.config)
                .with_resolved_component(self.root_module.as_ref());
            if !had_component {
                if let Some(component) = self.config.component() {
                    info!("Using component {} derived from the root module", component);
                }
            }
        }

        self.report = None;

        let reports = ReportSource::select(self.config.analysis_type, &self.remote)
            .acquire(workspace, &self.config)
            .await?;

        info!("Acquired {} SonarQube report(s)", reports.len());
        Ok(&*self.report.insert(InspectionReport::new(reports)))
    }

    /// The aggregate from the last successful [`read_reports`](Self::read_reports).
    pub fn inspection_report(&self) -> Option<&InspectionReport> {
        self.report.as_ref()
    }

    /// All issues; empty before reports are read.
    pub fn issues(&self) -> &[InspectionIssue] {
        self.report
            .as_ref()
            .map(InspectionReport::flat_issues)
            .unwrap_or_default()
    }

    /// All issues keyed by file path.
    pub fn report_data(&self) -> HashMap<String, Vec<&InspectionIssue>> {
        self.report_data_for(self.issues())
    }

    /// The given issues keyed by file path.
    pub fn report_data_for<'i, I>(&self, issues: I) -> HashMap<String, Vec<&'i InspectionIssue>>
    where
        I: IntoIterator<Item = &'i InspectionIssue>,
    {
        InspectionReport::as_multimap(issues, |i| i.file_path.clone())
    }

    pub fn raw_report(&self, config: &SubJobConfig) -> Option<&Report> {
        self.report.as_ref()?.raw_report(config)
    }
}
