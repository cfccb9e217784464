//! Pull-request acquisition: one delayed fetch from the SonarQube server.

use crate::config::{InspectionConfig, SubJobConfig};
use crate::error::{InspectionError, Result};
use crate::inspection::report::ReportInfo;
use crate::inspection::wait::{TokioWaiter, Waiter, WARM_UP_DELAY};
use crate::macros::{EnvMacroExpander, MacroContext, MacroExpander};
use crate::models::Report;
use crate::sonar::{
    isolate_component_key, ClientFactory, CredentialStore, EnvCredentialStore, IssueClient,
    InstallationRegistry,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fetches the issues of one pull request from the configured installation.
pub struct RemoteReportFetcher {
    registry: InstallationRegistry,
    clients: Arc<dyn ClientFactory>,
    credentials: Arc<dyn CredentialStore>,
    expander: Arc<dyn MacroExpander>,
    waiter: Arc<dyn Waiter>,
    env: HashMap<String, String>,
    warm_up: Duration,
}

impl RemoteReportFetcher {
    /// Fetcher using the process environment for credentials and expansion.
    pub fn new(registry: InstallationRegistry, clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            registry,
            clients,
            credentials: Arc::new(EnvCredentialStore::from_env()),
            expander: Arc::new(EnvMacroExpander),
            waiter: Arc::new(TokioWaiter::default()),
            env: std::env::vars().collect(),
            warm_up: WARM_UP_DELAY,
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_expander(mut self, expander: Arc<dyn MacroExpander>) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_waiter(mut self, waiter: Arc<dyn Waiter>) -> Self {
        self.waiter = waiter;
        self
    }

    /// Build variables visible to the pull-request key template.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Fetch the pull request's issues as a single report.
    ///
    /// Waits the warm-up delay once before opening the client. The client is
    /// closed whether or not the fetch succeeds.
    pub async fn fetch_one(
        &self,
        workspace: &Path,
        config: &InspectionConfig,
    ) -> Result<Vec<ReportInfo>> {
        let installation = self.registry.get(&config.sonar_installation_name).map_err(|e| {
            error!("{}", e);
            e
        })?;
        let credential = self.credentials.credential(installation)?;

        info!(
            "Waiting {}s for SonarQube to process the analysis",
            self.warm_up.as_secs()
        );
        self.waiter.wait(self.warm_up).await?;

        let client = self.clients.open(installation, credential.as_ref()).await?;
        let result = self.fetch_with(client.as_ref(), workspace, config).await;
        client.close();

        let report = result.map_err(|e| {
            error!("Failed to fetch issues: {}", e);
            e
        })?;

        Ok(vec![ReportInfo::new(SubJobConfig::default(), report)
            .with_auto_match(config.auto_match_for_pull_request)])
    }

    async fn fetch_with(
        &self,
        client: &dyn IssueClient,
        workspace: &Path,
        config: &InspectionConfig,
    ) -> Result<Report> {
        let context = MacroContext::new(workspace, self.env.clone());
        let pull_request_key = self
            .expander
            .expand(&config.pull_request_key, &context)
            .map_err(|e| InspectionError::Expansion {
                template: config.pull_request_key.clone(),
                message: e.to_string(),
            })?;

        let component = config.component().unwrap_or_default();
        if component.is_empty() {
            warn!("No SonarQube component configured; the issue search is not scoped");
        }
        let component_key = isolate_component_key(component);

        debug!(
            "Fetching pull request {} of component {}",
            pull_request_key, component_key
        );
        client.fetch_issues(&component_key, &pull_request_key).await
    }
}
