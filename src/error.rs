//! Error taxonomy for report acquisition.
//!
//! Every variant aborts the acquisition; there is no partial result.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why an expected report artifact could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// Nothing exists at the resolved path.
    NotFound,
    /// The resolved path is a directory.
    IsDirectory,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::NotFound => write!(f, "does not exist"),
            MissingReason::IsDirectory => write!(f, "is a directory"),
        }
    }
}

/// Report content is not a well-formed SonarQube report.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown severity '{severity}' on issue {key}")]
    UnknownSeverity { key: String, severity: String },

    #[error("invalid creation date '{value}' on issue {key}")]
    InvalidDate { key: String, value: String },
}

/// Fatal acquisition failure.
#[derive(Debug, Error)]
pub enum InspectionError {
    #[error("SonarQube report {path} {reason}; no project config available")]
    MissingReport { path: PathBuf, reason: MissingReason },

    #[error("Failed to parse report from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ParseError,
    },

    #[error("SonarQube installation '{0}' is not configured")]
    InstallationNotFound(String),

    #[error("Credentials '{credentials_id}' for installation '{installation}' could not be resolved")]
    Credential {
        installation: String,
        credentials_id: String,
    },

    #[error("Failed to expand '{template}': {message}")]
    Expansion { template: String, message: String },

    #[error("SonarQube request failed: {0}")]
    Transport(String),

    #[error("Acquisition interrupted while waiting for the server")]
    Interrupted,

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl From<reqwest::Error> for InspectionError {
    fn from(e: reqwest::Error) -> Self {
        InspectionError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InspectionError>;
