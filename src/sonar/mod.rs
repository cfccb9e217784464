//! SonarQube server access: installations, credentials and the web API client.

pub mod client;
pub mod installation;
pub mod util;

pub use client::{ClientFactory, IssueClient, SonarClient, SonarClientFactory};
pub use installation::{
    Credential, CredentialStore, EnvCredentialStore, Installation, InstallationRegistry,
    DEFAULT_INSTALLATION,
};
pub use util::{component_path, isolate_component_key};
