//! Report acquisition and normalization.
//!
//! File mode reads one report per sub-job from the workspace; pull-request
//! mode fetches a single report from the server. Both end in an
//! [`InspectionReport`].

pub mod connector;
pub mod file_reader;
pub mod remote;
pub mod report;
pub mod wait;
pub mod workspace;

pub use connector::{ReportSource, SonarConnector};
pub use file_reader::FileReportReader;
pub use remote::RemoteReportFetcher;
pub use report::{InspectionIssue, InspectionReport, ReportInfo};
pub use wait::{InterruptHandle, TokioWaiter, Waiter, WARM_UP_DELAY};
pub use workspace::{FsWorkspace, PathKind, Workspace};
