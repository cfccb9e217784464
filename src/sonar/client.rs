//! SonarQube web API client.
//!
//! The client is opened for one installation, used for a single issue
//! search and closed again. [`ClientFactory`] is the seam the remote fetcher
//! goes through so tests can substitute a recording client.

use crate::config::ClientConfig;
use crate::error::{InspectionError, Result};
use crate::models::{Component, Report};
use crate::report::parse_issue_page;
use crate::sonar::installation::{Credential, Installation};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SonarQube refuses to page past this many search results.
const MAX_SEARCH_RESULTS: usize = 10_000;

/// An open connection to a SonarQube server.
#[async_trait]
pub trait IssueClient: Send + Sync {
    /// Fetch the unresolved issues of a pull request for a project.
    async fn fetch_issues(&self, component_key: &str, pull_request_key: &str) -> Result<Report>;

    /// Release the connection.
    fn close(self: Box<Self>);
}

/// Opens clients for an installation.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn open(
        &self,
        installation: &Installation,
        credential: Option<&Credential>,
    ) -> Result<Box<dyn IssueClient>>;
}

/// reqwest-backed client for the `/api/issues/search` endpoint.
pub struct SonarClient {
    base_url: String,
    http_client: reqwest::Client,
    credential: Option<Credential>,
    page_size: usize,
}

impl SonarClient {
    /// Open a client for the given installation.
    pub fn open(
        installation: &Installation,
        credential: Option<&Credential>,
        config: &ClientConfig,
    ) -> Result<Self> {
        info!("Connecting to SonarQube at {}", installation.server_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: installation.server_url.trim_end_matches('/').to_string(),
            http_client,
            credential: credential.cloned(),
            page_size: config.page_size.clamp(1, 500),
        })
    }

    async fn fetch_page(
        &self,
        component_key: &str,
        pull_request_key: &str,
        page: usize,
    ) -> Result<crate::report::IssuePage> {
        let url = format!("{}/api/issues/search", self.base_url);
        let page_param = page.to_string();
        let size_param = self.page_size.to_string();

        debug!("GET {} page {} for {}", url, page, component_key);

        let mut request = self.http_client.get(&url).query(&[
            ("componentKeys", component_key),
            ("pullRequest", pull_request_key),
            ("resolved", "false"),
            ("p", page_param.as_str()),
            ("ps", size_param.as_str()),
        ]);

        if let Some(ref credential) = self.credential {
            request = request.basic_auth(credential.token(), Some(""));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InspectionError::Transport(format!("Request to {} timed out", url))
            } else if e.is_connect() {
                InspectionError::Transport(format!("Cannot connect to SonarQube at {}", self.base_url))
            } else {
                InspectionError::Transport(format!("Failed to send request: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read error body from {}: {}", url, e);
                String::new()
            });
            return Err(InspectionError::Transport(format!(
                "SonarQube API error {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        parse_issue_page(&body).map_err(|source| InspectionError::Parse { origin: url, source })
    }
}

#[async_trait]
impl IssueClient for SonarClient {
    async fn fetch_issues(&self, component_key: &str, pull_request_key: &str) -> Result<Report> {
        info!(
            "Fetching issues for {} (pull request {})",
            component_key, pull_request_key
        );

        let mut issues = Vec::new();
        let mut components: Vec<Component> = Vec::new();
        let mut seen_components = HashSet::new();
        let mut page = 1;

        loop {
            let result = self
                .fetch_page(component_key, pull_request_key, page)
                .await?;
            let received = result.report.issues.len();
            let total = result.total;

            issues.extend(result.report.issues);
            for component in result.report.components {
                if seen_components.insert(component.key.clone()) {
                    components.push(component);
                }
            }

            if received == 0 || issues.len() >= total {
                break;
            }
            if page * self.page_size >= MAX_SEARCH_RESULTS {
                warn!(
                    "Stopping after {} of {} issues: search window exhausted",
                    issues.len(),
                    total
                );
                break;
            }
            page += 1;
        }

        info!("Fetched {} issues from SonarQube", issues.len());
        Ok(Report::new(None, issues, components))
    }

    fn close(self: Box<Self>) {
        debug!("Closing SonarQube client for {}", self.base_url);
    }
}

/// Opens [`SonarClient`]s with shared client settings.
#[derive(Debug, Clone, Default)]
pub struct SonarClientFactory {
    config: ClientConfig,
}

impl SonarClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClientFactory for SonarClientFactory {
    async fn open(
        &self,
        installation: &Installation,
        credential: Option<&Credential>,
    ) -> Result<Box<dyn IssueClient>> {
        let client = SonarClient::open(installation, credential, &self.config)?;
        Ok(Box::new(client))
    }
}
