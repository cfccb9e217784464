//! sonar-inspect - SonarQube results for code review
//!
//! Acquires the issues of a SonarQube analysis, either from the report
//! files a build wrote to its workspace or from the server's pull-request
//! analysis, and normalizes them into one [`InspectionReport`].

pub mod cli;
pub mod config;
pub mod error;
pub mod inspection;
pub mod macros;
pub mod models;
pub mod report;
pub mod sonar;

pub use error::{InspectionError, MissingReason, ParseError};
pub use inspection::{InspectionIssue, InspectionReport, ReportInfo, SonarConnector};
