//! Client capability contract and factory
//!
//! [`VcsClient`] is the single interface callers depend on; both adapters
//! implement it and callers never branch on concrete provider type.
//! [`ClientBuilder`] is the only component that switches on provider
//! identity.

use crate::config::{VcsInfo, VcsProvider};
use crate::error::{ForgeLinkError, Result};
use crate::providers::{GitHubClient, GitLabClient};
use crate::types::{
    CommitInfo, CommitStatus, Permission, RepositoryInfo, WebhookEvent, WebhookRegistration,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Uniform operation set over Git hosting platforms
///
/// Every client is stateless beyond its immutable configuration and safe for
/// concurrent use. Operations honor caller cancellation by future drop:
/// dropping the returned future (for example via `tokio::time::timeout`)
/// aborts the in-flight HTTP call.
#[async_trait]
pub trait VcsClient: Send + Sync + std::fmt::Debug {
    /// Make one cheap authenticated call to verify credentials and endpoint
    ///
    /// A health check, not a guarantee of any specific permission.
    async fn test_connection(&self) -> Result<()>;

    /// List all repositories visible to the authenticated account, grouped
    /// by owner/namespace
    ///
    /// Pagination is exhausted transparently; a failure on any page aborts
    /// the whole call with no partial results.
    async fn list_repositories(&self) -> Result<HashMap<String, Vec<String>>>;

    /// List branch names of one repository
    async fn list_branches(&self, owner: &str, repository: &str) -> Result<Vec<String>>;

    /// Register a deploy key on a repository
    ///
    /// Fails with a validation error, before any network call, if `owner`,
    /// `repository`, `key_name`, or `public_key` is blank.
    async fn add_ssh_key_to_repository(
        &self,
        owner: &str,
        repository: &str,
        key_name: &str,
        public_key: &str,
        permission: Permission,
    ) -> Result<()>;

    /// Create a webhook delivering JSON payloads to `payload_url`
    ///
    /// A fresh shared secret is generated per call. `branch` filters push
    /// events on platforms that support it (GitLab); GitHub has no branch
    /// filter and ignores it.
    async fn create_webhook(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
        payload_url: &str,
        events: &[WebhookEvent],
    ) -> Result<WebhookRegistration>;

    /// Re-apply the full configuration of an existing webhook
    ///
    /// Fails with a parse error if `webhook_id` is not in the platform's
    /// identifier form.
    #[allow(clippy::too_many_arguments)]
    async fn update_webhook(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
        payload_url: &str,
        secret: &str,
        webhook_id: &str,
        events: &[WebhookEvent],
    ) -> Result<()>;

    /// Remove a webhook by the ID returned from [`Self::create_webhook`]
    async fn delete_webhook(&self, owner: &str, repository: &str, webhook_id: &str) -> Result<()>;

    /// Append a status entry at the given ref
    ///
    /// Platforms model status history as an append-only log, not an
    /// update-in-place record.
    #[allow(clippy::too_many_arguments)]
    async fn set_commit_status(
        &self,
        status: CommitStatus,
        owner: &str,
        repository: &str,
        reference: &str,
        title: &str,
        description: &str,
        details_url: &str,
    ) -> Result<()>;

    /// Download an archive of `branch` and extract it into `local_path`,
    /// stripping the platform-added top-level directory
    async fn download_repository(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
        local_path: &Path,
    ) -> Result<()>;

    /// Open a pull/merge request from `source_branch` into `target_branch`
    async fn create_pull_request(
        &self,
        owner: &str,
        repository: &str,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<()>;

    /// Most recent commit on a branch, normalized
    ///
    /// Returns `Ok(CommitInfo::default())`, not an error, when the branch
    /// has no commits.
    async fn get_latest_commit(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
    ) -> Result<CommitInfo>;

    /// Clone URLs of one repository
    async fn get_repository_info(&self, owner: &str, repository: &str) -> Result<RepositoryInfo>;

    /// One commit's normalized metadata; fails if the SHA does not exist
    async fn get_commit_by_sha(
        &self,
        owner: &str,
        repository: &str,
        sha: &str,
    ) -> Result<CommitInfo>;
}

/// Builds a [`VcsClient`] for a chosen provider
///
/// ```no_run
/// use forgelink::{ClientBuilder, VcsProvider};
///
/// # fn main() -> forgelink::Result<()> {
/// let client = ClientBuilder::new(VcsProvider::GitHub)
///     .token("ghp_example")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    provider: VcsProvider,
    info: VcsInfo,
}

impl ClientBuilder {
    pub fn new(provider: VcsProvider) -> Self {
        Self {
            provider,
            info: VcsInfo::default(),
        }
    }

    /// Override the platform's default API endpoint
    pub fn api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.info.api_endpoint = Some(endpoint.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.info.token = Some(token.into());
        self
    }

    /// Username, consumed only by basic-auth-style providers
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.info.username = Some(username.into());
        self
    }

    /// Construct the adapter for the configured provider
    ///
    /// Fails with a configuration error on a malformed endpoint URL.
    pub fn build(self) -> Result<Box<dyn VcsClient>> {
        match self.provider {
            VcsProvider::GitHub => Ok(Box::new(GitHubClient::new(self.info)?)),
            VcsProvider::GitLab => Ok(Box::new(GitLabClient::new(self.info)?)),
        }
    }
}

/// Reject blank required arguments before any network call
pub(crate) fn validate_not_blank(params: &[(&str, &str)]) -> Result<()> {
    for (name, value) in params {
        if value.trim().is_empty() {
            return Err(ForgeLinkError::Validation(format!(
                "Required parameter '{}' is blank",
                name
            )));
        }
    }
    Ok(())
}
