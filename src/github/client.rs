//! GitHub App client.
//!
//! Holds an app-authenticated `Octocrab` (JWT from the app's private key) and
//! mints installation-scoped clients on demand.

use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId as OctoInstallationId};
use thiserror::Error;
use tracing::debug;

use crate::types::InstallationId;

use super::error::GitHubApiError;
use super::retry::RetryConfig;

#[derive(Debug, Error)]
pub enum GitHubAppError {
    #[error("invalid GitHub App private key: {0}")]
    PrivateKey(#[from] jsonwebtoken::errors::Error),

    #[error("failed to build GitHub client: {0}")]
    Client(#[from] octocrab::Error),
}

/// A GitHub App identity.
#[derive(Clone)]
pub struct GitHubApp {
    app_id: u64,
    client: Octocrab,
    pub(super) retry: RetryConfig,
}

impl GitHubApp {
    /// Builds an app client from its numeric id and PEM-encoded RSA key.
    pub fn new(app_id: u64, private_key_pem: &str) -> Result<Self, GitHubAppError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;
        let client = Octocrab::builder().app(AppId(app_id), key).build()?;
        Ok(Self::from_octocrab(app_id, client))
    }

    /// Wraps a pre-built client (custom base URL, tests).
    pub fn from_octocrab(app_id: u64, client: Octocrab) -> Self {
        Self {
            app_id,
            client,
            retry: RetryConfig::DEFAULT,
        }
    }

    /// Returns a client authenticated as the given installation.
    pub async fn installation_client(
        &self,
        installation: InstallationId,
    ) -> Result<Octocrab, GitHubApiError> {
        debug!(%installation, "Minting installation token");
        let (client, _token) = self
            .client
            .installation_and_token(OctoInstallationId(installation.0))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(client)
    }
}

/// Page where users install the app, when its public name is known.
pub fn install_url(app_name: &str) -> String {
    format!("https://github.com/apps/{}/installations/new", app_name)
}

impl std::fmt::Debug for GitHubApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApp")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}
