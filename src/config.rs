//! Provider selection and credentials
//!
//! A client is built from a [`VcsInfo`] (endpoint, token, username) plus a
//! [`VcsProvider`] selector. [`VcsConfig`] bundles both into a YAML-loadable
//! file for processes that wire the client from configuration.

use crate::client::ClientBuilder;
use crate::error::{ForgeLinkError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Supported hosting platforms
///
/// The [`ClientBuilder`] is the only place that branches on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsProvider {
    GitHub,
    GitLab,
}

impl fmt::Display for VcsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsProvider::GitHub => write!(f, "github"),
            VcsProvider::GitLab => write!(f, "gitlab"),
        }
    }
}

impl FromStr for VcsProvider {
    type Err = ForgeLinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "github" => Ok(VcsProvider::GitHub),
            "gitlab" => Ok(VcsProvider::GitLab),
            other => Err(ForgeLinkError::Config(format!(
                "Unknown VCS provider: {}",
                other
            ))),
        }
    }
}

/// Connection details for one hosting platform
///
/// Immutable once a client is built; owned exclusively by the adapter
/// constructed from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcsInfo {
    /// API endpoint URL; `None` means the platform default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,

    /// Access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Username, required only for basic-auth-style providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// On-disk client configuration
///
/// Thin process-level wiring: the adapters themselves consume only a
/// [`VcsInfo`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    /// Which platform this configuration targets
    pub provider: VcsProvider,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl VcsConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ForgeLinkError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading ForgeLink configuration");

        let content = fs::read_to_string(path)?;
        let config: VcsConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving ForgeLink configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Convert into a [`ClientBuilder`] carrying these settings
    pub fn into_builder(self) -> ClientBuilder {
        let mut builder = ClientBuilder::new(self.provider);
        if let Some(endpoint) = self.api_endpoint {
            builder = builder.api_endpoint(endpoint);
        }
        if let Some(token) = self.token {
            builder = builder.token(token);
        }
        if let Some(username) = self.username {
            builder = builder.username(username);
        }
        builder
    }
}
