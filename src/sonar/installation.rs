//! SonarQube installation and credential resolution.

use crate::config::InstallationConfig;
use crate::error::{InspectionError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Name of the installation built from the inspection's own server URL.
pub const DEFAULT_INSTALLATION: &str = "default";

/// A resolved server installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub name: String,
    pub server_url: String,
    pub credentials_id: Option<String>,
}

impl From<&InstallationConfig> for Installation {
    fn from(config: &InstallationConfig) -> Self {
        Self {
            name: config.name.clone(),
            server_url: config.server_url.trim_end_matches('/').to_string(),
            credentials_id: config.credentials_id.clone(),
        }
    }
}

/// Secret used to authenticate against an installation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Named installations from the configuration.
#[derive(Debug, Clone, Default)]
pub struct InstallationRegistry {
    installations: Vec<Installation>,
}

impl InstallationRegistry {
    pub fn new(configs: &[InstallationConfig]) -> Self {
        Self {
            installations: configs.iter().map(Installation::from).collect(),
        }
    }

    /// Add an anonymous `default` installation at `server_url` when none is configured.
    pub fn with_fallback_url(mut self, server_url: &str) -> Self {
        let server_url = server_url.trim();
        if self.installations.is_empty() && !server_url.is_empty() {
            debug!("No installations configured, using {}", server_url);
            self.installations.push(Installation {
                name: DEFAULT_INSTALLATION.to_string(),
                server_url: server_url.trim_end_matches('/').to_string(),
                credentials_id: None,
            });
        }
        self
    }

    /// Look up an installation by name.
    ///
    /// A blank name selects the only installation when exactly one exists.
    pub fn get(&self, name: &str) -> Result<&Installation> {
        let name = name.trim();

        if name.is_empty() && self.installations.len() == 1 {
            return Ok(&self.installations[0]);
        }

        self.installations
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| InspectionError::InstallationNotFound(name.to_string()))
    }
}

/// Resolves the credential bound to an installation.
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` means the installation is used anonymously.
    fn credential(&self, installation: &Installation) -> Result<Option<Credential>>;
}

/// Reads tokens from environment variables named by `credentials_id`.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialStore {
    env: HashMap<String, String>,
}

impl EnvCredentialStore {
    /// Snapshot of the process environment.
    pub fn from_env() -> Self {
        Self::new(std::env::vars().collect())
    }

    pub fn new(env: HashMap<String, String>) -> Self {
        Self { env }
    }
}

impl CredentialStore for EnvCredentialStore {
    fn credential(&self, installation: &Installation) -> Result<Option<Credential>> {
        let Some(ref id) = installation.credentials_id else {
            debug!("Installation {} has no credentials", installation.name);
            return Ok(None);
        };

        match self.env.get(id) {
            Some(token) if !token.is_empty() => Ok(Some(Credential::new(token.clone()))),
            _ => Err(InspectionError::Credential {
                installation: installation.name.clone(),
                credentials_id: id.clone(),
            }),
        }
    }
}
