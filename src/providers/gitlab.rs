//! GitLab Adapter
//!
//! Translates the generic [`VcsClient`] contract into GitLab REST API v4
//! calls. Repositories are addressed by a percent-encoded `owner/repo`
//! project path (never exposed to callers); listings paginate with GitLab's
//! one-indexed page counter and `x-total-pages` response header.

use crate::archive;
use crate::client::{validate_not_blank, VcsClient};
use crate::config::VcsInfo;
use crate::error::{ForgeLinkError, Result};
use crate::token::generate_token;
use crate::types::{
    CloneInfo, CommitInfo, CommitStatus, Permission, RepositoryInfo, WebhookEvent,
    WebhookRegistration,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Per-request timeout for reads
const GET_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout for create/update operations
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);
/// Page size used when draining paginated listings
const PER_PAGE: u32 = 100;

const DEFAULT_ENDPOINT: &str = "https://gitlab.com";

/// GitLab API client
#[derive(Debug)]
pub struct GitLabClient {
    client: Client,
    api_base: String,
}

impl GitLabClient {
    /// Create a new GitLab adapter from connection details
    ///
    /// The token is installed as the `PRIVATE-TOKEN` default header. Returns
    /// a configuration error if the endpoint URL is malformed or the token
    /// contains bytes that cannot appear in a header.
    pub fn new(info: VcsInfo) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("forgelink/0.1"),
        );
        if let Some(token) = &info.token {
            let mut value = header::HeaderValue::from_str(token).map_err(|_| {
                ForgeLinkError::Config(
                    "GitLab token contains characters not allowed in a header".to_string(),
                )
            })?;
            value.set_sensitive(true);
            headers.insert("PRIVATE-TOKEN", value);
        }
        let client = Client::builder().default_headers(headers).build()?;

        let endpoint = match info.api_endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => {
                let trimmed = endpoint.trim_end_matches('/');
                url::Url::parse(trimmed).map_err(|e| {
                    ForgeLinkError::Config(format!("Invalid GitLab endpoint '{}': {}", endpoint, e))
                })?;
                trimmed.to_string()
            }
            _ => DEFAULT_ENDPOINT.to_string(),
        };

        Ok(Self {
            client,
            api_base: format!("{}/api/v4", endpoint),
        })
    }

    /// Surface non-success responses with status and body text preserved
    async fn check(&self, response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ForgeLinkError::Api(format!(
            "GitLab {} failed: HTTP {}: {}",
            context,
            status.as_u16(),
            body
        )))
    }
}

/// Composite project path, percent-encoded for use as a path segment
fn project_path(owner: &str, repository: &str) -> String {
    urlencoding::encode(&format!("{}/{}", owner, repository)).into_owned()
}

/// Total page count advertised by the `x-total-pages` header, 0 when absent
fn total_pages(headers: &header::HeaderMap) -> u32 {
    headers
        .get("x-total-pages")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct GitLabGroup {
    path: String,
}

#[derive(Debug, Deserialize)]
struct GitLabProject {
    path: String,
    #[serde(default)]
    http_url_to_repo: String,
    #[serde(default)]
    ssh_url_to_repo: String,
}

#[derive(Debug, Deserialize)]
struct GitLabBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitLabHook {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct GitLabCommit {
    id: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    committer_name: String,
    #[serde(default)]
    web_url: String,
    #[serde(default)]
    committed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    parent_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GitLabDeployKeyRequest {
    title: String,
    key: String,
    can_push: bool,
}

#[derive(Debug, Serialize)]
struct GitLabHookRequest {
    url: String,
    token: String,
    push_events: bool,
    merge_requests_events: bool,
    push_events_branch_filter: String,
}

#[derive(Debug, Serialize)]
struct GitLabStatusRequest {
    state: String,
    #[serde(rename = "ref")]
    reference: String,
    name: String,
    description: String,
    target_url: String,
}

#[derive(Debug, Serialize)]
struct GitLabMergeRequest {
    source_branch: String,
    target_branch: String,
    title: String,
    description: String,
}

/// GitLab's commit-status vocabulary
///
/// Fail and Error collapse to the same wire value; GitLab has no separate
/// error state.
fn commit_state(status: CommitStatus) -> &'static str {
    match status {
        CommitStatus::Pass => "success",
        CommitStatus::Fail => "failed",
        CommitStatus::Error => "failed",
        CommitStatus::InProgress => "running",
    }
}

/// Map generic events onto GitLab project-hook flags
///
/// The branch filter applies to push events only.
fn hook_request(
    payload_url: &str,
    secret: &str,
    branch: &str,
    events: &[WebhookEvent],
) -> GitLabHookRequest {
    let mut request = GitLabHookRequest {
        url: payload_url.to_string(),
        token: secret.to_string(),
        push_events: false,
        merge_requests_events: false,
        push_events_branch_filter: String::new(),
    };
    for event in events {
        match event {
            WebhookEvent::PrCreated | WebhookEvent::PrEdited => {
                request.merge_requests_events = true;
            }
            WebhookEvent::Push => {
                request.push_events = true;
                request.push_events_branch_filter = branch.to_string();
            }
        }
    }
    request
}

fn parse_webhook_id(webhook_id: &str) -> Result<i64> {
    webhook_id.parse().map_err(|_| {
        ForgeLinkError::Parse(format!(
            "Webhook id '{}' is not a numeric GitLab hook id",
            webhook_id
        ))
    })
}

fn map_commit(commit: GitLabCommit) -> CommitInfo {
    CommitInfo {
        hash: commit.id,
        author_name: commit.author_name,
        committer_name: commit.committer_name,
        url: commit.web_url,
        timestamp: commit
            .committed_date
            .map(|d| d.timestamp())
            .unwrap_or_default(),
        message: commit.message,
        parent_hashes: commit.parent_ids,
    }
}

#[async_trait]
impl VcsClient for GitLabClient {
    async fn test_connection(&self) -> Result<()> {
        let url = format!("{}/projects", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[("per_page", "1")])
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        self.check(response, "connection test").await?;
        Ok(())
    }

    async fn list_repositories(&self) -> Result<HashMap<String, Vec<String>>> {
        let groups_url = format!("{}/groups", self.api_base);
        let response = self
            .client
            .get(&groups_url)
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "group listing").await?;
        let groups: Vec<GitLabGroup> = response.json().await?;

        let mut results: HashMap<String, Vec<String>> = HashMap::new();
        for group in groups {
            let url = format!(
                "{}/groups/{}/projects",
                self.api_base,
                urlencoding::encode(&group.path)
            );
            let mut page: u32 = 1;
            loop {
                let response = self
                    .client
                    .get(&url)
                    .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
                    .timeout(GET_TIMEOUT)
                    .send()
                    .await?;
                let response = self.check(response, "group project listing").await?;
                let total = total_pages(response.headers());
                let projects: Vec<GitLabProject> = response.json().await?;
                results
                    .entry(group.path.clone())
                    .or_default()
                    .extend(projects.into_iter().map(|p| p.path));
                if page >= total {
                    break;
                }
                page += 1;
            }
        }
        debug!(groups = results.len(), "GitLab repository listing complete");
        Ok(results)
    }

    async fn list_branches(&self, owner: &str, repository: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/projects/{}/repository/branches",
            self.api_base,
            project_path(owner, repository)
        );
        let mut results = Vec::new();
        let mut page: u32 = 1;
        loop {
            let response = self
                .client
                .get(&url)
                .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
                .timeout(GET_TIMEOUT)
                .send()
                .await?;
            let response = self.check(response, "branch listing").await?;
            let total = total_pages(response.headers());
            let branches: Vec<GitLabBranch> = response.json().await?;
            results.extend(branches.into_iter().map(|b| b.name));
            if page >= total {
                break;
            }
            page += 1;
        }
        Ok(results)
    }

    async fn add_ssh_key_to_repository(
        &self,
        owner: &str,
        repository: &str,
        key_name: &str,
        public_key: &str,
        permission: Permission,
    ) -> Result<()> {
        validate_not_blank(&[
            ("owner", owner),
            ("repository", repository),
            ("key name", key_name),
            ("public key", public_key),
        ])?;

        let url = format!(
            "{}/projects/{}/deploy_keys",
            self.api_base,
            project_path(owner, repository)
        );
        let body = GitLabDeployKeyRequest {
            title: key_name.to_string(),
            key: public_key.to_string(),
            can_push: permission == Permission::ReadWrite,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "deploy key creation").await?;
        info!(owner, repository, key_name, "GitLab deploy key created");
        Ok(())
    }

    async fn create_webhook(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
        payload_url: &str,
        events: &[WebhookEvent],
    ) -> Result<WebhookRegistration> {
        let secret = generate_token();
        let body = hook_request(payload_url, &secret, branch, events);
        let url = format!(
            "{}/projects/{}/hooks",
            self.api_base,
            project_path(owner, repository)
        );
        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "webhook creation").await?;
        let hook: GitLabHook = response.json().await?;
        info!(owner, repository, id = hook.id, "GitLab webhook created");
        Ok(WebhookRegistration {
            id: hook.id.to_string(),
            secret,
        })
    }

    async fn update_webhook(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
        payload_url: &str,
        secret: &str,
        webhook_id: &str,
        events: &[WebhookEvent],
    ) -> Result<()> {
        let id = parse_webhook_id(webhook_id)?;
        let body = hook_request(payload_url, secret, branch, events);
        let url = format!(
            "{}/projects/{}/hooks/{}",
            self.api_base,
            project_path(owner, repository),
            id
        );
        let response = self
            .client
            .put(&url)
            .json(&body)
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "webhook update").await?;
        Ok(())
    }

    async fn delete_webhook(&self, owner: &str, repository: &str, webhook_id: &str) -> Result<()> {
        let id = parse_webhook_id(webhook_id)?;
        let url = format!(
            "{}/projects/{}/hooks/{}",
            self.api_base,
            project_path(owner, repository),
            id
        );
        let response = self
            .client
            .delete(&url)
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "webhook deletion").await?;
        Ok(())
    }

    async fn set_commit_status(
        &self,
        status: CommitStatus,
        owner: &str,
        repository: &str,
        reference: &str,
        title: &str,
        description: &str,
        details_url: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/projects/{}/statuses/{}",
            self.api_base,
            project_path(owner, repository),
            reference
        );
        let body = GitLabStatusRequest {
            state: commit_state(status).to_string(),
            reference: reference.to_string(),
            name: title.to_string(),
            description: description.to_string(),
            target_url: details_url.to_string(),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "commit status creation").await?;
        debug!(owner, repository, reference, state = body.state.as_str(), "GitLab commit status set");
        Ok(())
    }

    async fn download_repository(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
        local_path: &Path,
    ) -> Result<()> {
        let url = format!(
            "{}/projects/{}/repository/archive.tar.gz",
            self.api_base,
            project_path(owner, repository)
        );
        // No request timeout: archive size is unbounded
        let response = self.client.get(&url).query(&[("sha", branch)]).send().await?;
        let response = self.check(response, "repository download").await?;
        archive::extract_archive_response(response, local_path).await?;
        info!(
            owner,
            repository,
            branch,
            path = %local_path.display(),
            "GitLab repository archive extracted"
        );
        Ok(())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repository: &str,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/projects/{}/merge_requests",
            self.api_base,
            project_path(owner, repository)
        );
        let body = GitLabMergeRequest {
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "merge request creation").await?;
        info!(owner, repository, source_branch, target_branch, "GitLab merge request opened");
        Ok(())
    }

    async fn get_latest_commit(
        &self,
        owner: &str,
        repository: &str,
        branch: &str,
    ) -> Result<CommitInfo> {
        validate_not_blank(&[
            ("owner", owner),
            ("repository", repository),
            ("branch", branch),
        ])?;

        let url = format!(
            "{}/projects/{}/repository/commits",
            self.api_base,
            project_path(owner, repository)
        );
        let response = self
            .client
            .get(&url)
            .query(&[("ref_name", branch), ("per_page", "1"), ("page", "1")])
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "latest commit lookup").await?;
        let commits: Vec<GitLabCommit> = response.json().await?;
        Ok(commits
            .into_iter()
            .next()
            .map(map_commit)
            .unwrap_or_default())
    }

    async fn get_repository_info(&self, owner: &str, repository: &str) -> Result<RepositoryInfo> {
        validate_not_blank(&[("owner", owner), ("repository", repository)])?;

        let url = format!(
            "{}/projects/{}",
            self.api_base,
            project_path(owner, repository)
        );
        let response = self
            .client
            .get(&url)
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "project lookup").await?;
        let project: GitLabProject = response.json().await?;
        Ok(RepositoryInfo {
            clone_info: CloneInfo {
                http: project.http_url_to_repo,
                ssh: project.ssh_url_to_repo,
            },
        })
    }

    async fn get_commit_by_sha(
        &self,
        owner: &str,
        repository: &str,
        sha: &str,
    ) -> Result<CommitInfo> {
        validate_not_blank(&[("owner", owner), ("repository", repository), ("sha", sha)])?;

        let url = format!(
            "{}/projects/{}/repository/commits/{}",
            self.api_base,
            project_path(owner, repository),
            sha
        );
        let response = self
            .client
            .get(&url)
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "commit lookup").await?;
        Ok(map_commit(response.json().await?))
    }
}
