//! Data models for SonarQube inspection results.
//!
//! This module contains the normalized report structures shared by the
//! file and pull-request acquisition paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of an issue, as reported by SonarQube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational finding, no impact on quality gates
    Info,
    /// Minor code smell
    Minor,
    /// Major code smell or likely bug
    Major,
    /// Critical bug or vulnerability
    Critical,
    /// Blocker, must be fixed before merge
    Blocker,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Minor => write!(f, "MINOR"),
            Severity::Major => write!(f, "MAJOR"),
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Blocker => write!(f, "BLOCKER"),
        }
    }
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Minor,
        Severity::Major,
        Severity::Critical,
        Severity::Blocker,
    ];

    /// Parse a server severity string, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "INFO" => Some(Severity::Info),
            "MINOR" => Some(Severity::Minor),
            "MAJOR" => Some(Severity::Major),
            "CRITICAL" => Some(Severity::Critical),
            "BLOCKER" => Some(Severity::Blocker),
            _ => None,
        }
    }

    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "⚪",
            Severity::Minor => "🟢",
            Severity::Major => "🟡",
            Severity::Critical => "🟠",
            Severity::Blocker => "🔴",
        }
    }
}

/// A single finding from a SonarQube analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Server-side issue key.
    pub key: String,
    /// Component key the issue belongs to (`group:artifact:path`).
    pub component: String,
    /// Line number (1-indexed); `None` for file-level issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Human-readable message.
    pub message: String,
    /// Severity of the issue.
    pub severity: Severity,
    /// Rule identifier, e.g. `squid:S1166`.
    pub rule: String,
    /// Workflow status (`OPEN`, `CONFIRMED`, ...).
    pub status: String,
    /// Whether the issue was introduced by the analyzed change.
    pub is_new: bool,
    /// When the server first saw the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
}

/// A source component referenced by issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component key.
    pub key: String,
    /// Path relative to the module root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Key of the owning module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_key: Option<String>,
    /// Change status (`SAME`, `CHANGED`, `ADDED`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A parsed analysis report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Version of the server that produced the report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Issues in server order.
    pub issues: Vec<Issue>,
    /// Components referenced by the issues.
    pub components: Vec<Component>,
}

impl Report {
    /// Creates a report from its parts.
    pub fn new(version: Option<String>, issues: Vec<Issue>, components: Vec<Component>) -> Self {
        Self {
            version,
            issues,
            components,
        }
    }

    /// Number of issues in the report.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Look up a component by key.
    pub fn component(&self, key: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.key == key)
    }
}
