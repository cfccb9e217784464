//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::AnalysisType;
use clap::Parser;
use std::path::PathBuf;

/// sonar-inspect - SonarQube results for code review
///
/// Reads the SonarQube reports produced by a build, or fetches the issues of
/// a pull-request analysis from the server, and prints them grouped by file.
///
/// Examples:
///   sonar-inspect --workspace ./build
///   sonar-inspect --mode pull-request --installation sonar --pull-request-key '${GERRIT_CHANGE_NUMBER}'
///   sonar-inspect --workspace . --format json --output issues.json
///   sonar-inspect --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Workspace directory the build ran in
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub workspace: PathBuf,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sonar-inspect.toml in the current
    /// directory, then in the workspace
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where to take results from (file, pull-request)
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// SonarQube component (project) key
    ///
    /// Derived from the root module when not set.
    #[arg(long, value_name = "KEY", env = "SONAR_COMPONENT")]
    pub component: Option<String>,

    /// Name of the configured SonarQube installation
    #[arg(long, value_name = "NAME")]
    pub installation: Option<String>,

    /// Template expanded to the pull-request identifier
    ///
    /// Example: --pull-request-key '${GERRIT_CHANGE_NUMBER}'
    #[arg(long, value_name = "TEMPLATE")]
    pub pull_request_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path; prints to stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .sonar-inspect.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Acquisition mode selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    File,
    PullRequest,
}

impl From<ModeArg> for AnalysisType {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::File => AnalysisType::File,
            ModeArg::PullRequest => AnalysisType::PullRequest,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if !self.workspace.exists() {
            return Err(format!(
                "Workspace does not exist: {}",
                self.workspace.display()
            ));
        }
        if !self.workspace.is_dir() {
            return Err(format!(
                "Workspace is not a directory: {}",
                self.workspace.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            workspace: PathBuf::from("."),
            config: None,
            mode: None,
            component: None,
            installation: None,
            pull_request_key: None,
            timeout: None,
            format: OutputFormat::Markdown,
            output: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_mode_flag() {
        let args = Args::parse_from(["sonar-inspect", "--mode", "pull-request", "--format", "json"]);
        assert_eq!(args.mode, Some(ModeArg::PullRequest));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(AnalysisType::from(ModeArg::PullRequest), AnalysisType::PullRequest);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_workspace() {
        let mut args = make_args();
        args.workspace = PathBuf::from("/definitely/not/a/workspace");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
