//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sonar-inspect.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory and workspace.
pub const CONFIG_FILE_NAME: &str = ".sonar-inspect.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// What to inspect and how.
    #[serde(default)]
    pub inspection: InspectionConfig,

    /// Known SonarQube installations.
    #[serde(default)]
    pub installations: Vec<InstallationConfig>,

    /// Build description.
    #[serde(default)]
    pub build: BuildConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Where SonarQube results come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    /// Read report artifacts written to the workspace.
    #[default]
    File,
    /// Fetch pull-request issues from the server.
    PullRequest,
}

/// One analysis unit of a multi-module build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubJobConfig {
    /// Report artifact path, relative to the workspace.
    #[serde(default = "default_report_path")]
    pub sonar_report_path: String,

    /// Module directory, relative to the repository root.
    #[serde(default)]
    pub project_path: String,

    /// Match issue paths against changed files by suffix.
    #[serde(default)]
    pub auto_match: bool,
}

impl Default for SubJobConfig {
    fn default() -> Self {
        Self {
            sonar_report_path: default_report_path(),
            project_path: String::new(),
            auto_match: false,
        }
    }
}

impl SubJobConfig {
    pub fn new(sonar_report_path: impl Into<String>, project_path: impl Into<String>) -> Self {
        Self {
            sonar_report_path: sonar_report_path.into(),
            project_path: project_path.into(),
            auto_match: false,
        }
    }
}

fn default_report_path() -> String {
    "target/sonar/sonar-report.json".to_string()
}

/// Inspection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionConfig {
    /// Acquisition strategy.
    #[serde(default)]
    pub analysis_type: AnalysisType,

    /// SonarQube server URL, used anonymously when no installation is configured.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Name of the installation used for pull-request fetches.
    #[serde(default)]
    pub sonar_installation_name: String,

    /// Component (project) key; derived from the root module when blank.
    #[serde(default)]
    pub component: Option<String>,

    /// Template expanded to the pull-request identifier.
    #[serde(default = "default_pull_request_key")]
    pub pull_request_key: String,

    /// Auto-match setting for the synthetic pull-request sub-job.
    #[serde(default)]
    pub auto_match_for_pull_request: bool,

    /// Single-module configuration.
    #[serde(default)]
    pub base: SubJobConfig,

    /// Per-module configurations; when empty `base` is used.
    #[serde(default)]
    pub sub_jobs: Vec<SubJobConfig>,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::default(),
            server_url: default_server_url(),
            sonar_installation_name: String::new(),
            component: None,
            pull_request_key: default_pull_request_key(),
            auto_match_for_pull_request: false,
            base: SubJobConfig::default(),
            sub_jobs: Vec::new(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_pull_request_key() -> String {
    "${GERRIT_CHANGE_NUMBER}".to_string()
}

impl InspectionConfig {
    /// Every sub-job to read in file mode, in configured order.
    pub fn all_sub_job_configs(&self) -> Vec<SubJobConfig> {
        if self.sub_jobs.is_empty() {
            vec![self.base.clone()]
        } else {
            self.sub_jobs.clone()
        }
    }

    /// The configured component, if it is set and not blank.
    pub fn component(&self) -> Option<&str> {
        self.component
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Fill in the component from the root module when it is missing.
    ///
    /// A config that already carries a component is returned unchanged, so
    /// applying this repeatedly yields the same value.
    pub fn with_resolved_component(mut self, root_module: Option<&RootModule>) -> Self {
        if self.component().is_none() {
            if let Some(module) = root_module {
                self.component = Some(module.component_key());
            }
        }
        self
    }
}

/// A named SonarQube installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationConfig {
    pub name: String,
    pub server_url: String,

    /// Identifier handed to the credential store.
    #[serde(default)]
    pub credentials_id: Option<String>,
}

/// Build description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Root module of a multi-module build.
    #[serde(default)]
    pub root_module: Option<RootModule>,
}

/// Coordinates of the root module of a multi-module build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootModule {
    pub group_id: String,
    pub artifact_id: String,
}

impl RootModule {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// `group:artifact`.
    pub fn component_key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Issues requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_page_size() -> usize {
    500
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory (e.g. the workspace).
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings and only
    /// override values they explicitly provide.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(mode) = args.mode {
            self.inspection.analysis_type = mode.into();
        }
        if let Some(ref component) = args.component {
            self.inspection.component = Some(component.clone());
        }
        if let Some(ref name) = args.installation {
            self.inspection.sonar_installation_name = name.clone();
        }
        if let Some(ref key) = args.pull_request_key {
            self.inspection.pull_request_key = key.clone();
        }
        if let Some(timeout) = args.timeout {
            self.client.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.inspection.analysis_type, AnalysisType::File);
        assert_eq!(config.inspection.server_url, "http://localhost:9000");
        assert_eq!(
            config.inspection.base.sonar_report_path,
            "target/sonar/sonar-report.json"
        );
        assert_eq!(config.inspection.base.project_path, "");
        assert!(!config.inspection.base.auto_match);
        assert!(!config.inspection.auto_match_for_pull_request);
        assert_eq!(config.client.timeout_seconds, 60);
    }

    #[test]
    fn test_all_sub_job_configs_falls_back_to_base() {
        let config = InspectionConfig::default();
        let all = config.all_sub_job_configs();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], SubJobConfig::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[inspection]
analysis_type = "pull-request"
sonar_installation_name = "sonar"
pull_request_key = "$GERRIT_CHANGE_NUMBER"

[[inspection.sub_jobs]]
sonar_report_path = "core/target/sonar/sonar-report.json"
project_path = "core"

[[inspection.sub_jobs]]
sonar_report_path = "web/target/sonar/sonar-report.json"
project_path = "web"
auto_match = true

[[installations]]
name = "sonar"
server_url = "https://sonar.example.com"
credentials_id = "SONAR_TOKEN"

[build.root_module]
group_id = "com.acme"
artifact_id = "foo"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.inspection.analysis_type, AnalysisType::PullRequest);
        assert_eq!(config.inspection.pull_request_key, "$GERRIT_CHANGE_NUMBER");

        let sub_jobs = config.inspection.all_sub_job_configs();
        assert_eq!(sub_jobs.len(), 2);
        assert_eq!(sub_jobs[0].project_path, "core");
        assert!(sub_jobs[1].auto_match);

        assert_eq!(config.installations.len(), 1);
        assert_eq!(
            config.installations[0].credentials_id.as_deref(),
            Some("SONAR_TOKEN")
        );
        assert_eq!(
            config.build.root_module,
            Some(RootModule::new("com.acme", "foo"))
        );
    }

    #[test]
    fn test_resolved_component_from_root_module() {
        let module = RootModule::new("com.acme", "foo");
        let config = InspectionConfig {
            component: Some("  ".to_string()),
            ..InspectionConfig::default()
        };

        let resolved = config.with_resolved_component(Some(&module));
        assert_eq!(resolved.component(), Some("com.acme:foo"));

        let again = resolved.clone().with_resolved_component(Some(&RootModule::new("x", "y")));
        assert_eq!(again, resolved);
    }

    #[test]
    fn test_resolved_component_keeps_existing() {
        let config = InspectionConfig {
            component: Some("org.example:bar".to_string()),
            ..InspectionConfig::default()
        };

        let resolved = config
            .clone()
            .with_resolved_component(Some(&RootModule::new("com.acme", "foo")));
        assert_eq!(resolved, config);
    }

    #[test]
    fn test_resolved_component_without_root_module() {
        let resolved = InspectionConfig::default().with_resolved_component(None);
        assert_eq!(resolved.component(), None);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[inspection]"));
        assert!(toml_str.contains("[client]"));
    }
}
