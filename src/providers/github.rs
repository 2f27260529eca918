//! GitHub Adapter
//!
//! Translates the generic [`VcsClient`] contract into GitHub REST API v3
//! calls. Listings paginate with GitHub's zero-indexed page counter, reading
//! the last page from the `Link` response header. Webhook IDs are numeric on
//! the wire and round-trip through the opaque-string contract.

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
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
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

const DEFAULT_API_ENDPOINT: &str = "https://api.github.com";

/// GitHub API client
#[derive(Debug)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a new GitHub adapter from connection details
    ///
    /// Returns a configuration error if the endpoint URL is malformed.
    pub fn new(info: VcsInfo) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static("forgelink/0.1"),
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/vnd.github.v3+json"),
                );
                headers
            })
            .build()?;

        let api_base = match info.api_endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => {
                let trimmed = endpoint.trim_end_matches('/');
                url::Url::parse(trimmed).map_err(|e| {
                    ForgeLinkError::Config(format!("Invalid GitHub endpoint '{}': {}", endpoint, e))
                })?;
                trimmed.to_string()
            }
            _ => DEFAULT_API_ENDPOINT.to_string(),
        };

        Ok(Self {
            client,
            api_base,
            token: info.token,
        })
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Surface non-success responses with status and body text preserved
    async fn check(&self, response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ForgeLinkError::Api(format!(
            "GitHub {} failed: HTTP {}: {}",
            context,
            status.as_u16(),
            body
        )))
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    owner: GitHubAccount,
    #[serde(default)]
    clone_url: String,
    #[serde(default)]
    ssh_url: String,
}

#[derive(Debug, Deserialize)]
struct GitHubAccount {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubHook {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
    #[serde(default)]
    url: String,
    commit: GitHubCommitDetails,
    #[serde(default)]
    parents: Vec<GitHubCommitRef>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitDetails {
    #[serde(default)]
    author: Option<GitHubSignature>,
    #[serde(default)]
    committer: Option<GitHubSignature>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GitHubSignature {
    #[serde(default)]
    name: String,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitRef {
    sha: String,
}

#[derive(Debug, Serialize)]
struct GitHubKeyRequest {
    title: String,
    key: String,
    read_only: bool,
}

#[derive(Debug, Serialize)]
struct GitHubHookRequest {
    events: Vec<String>,
    config: GitHubHookConfig,
}

#[derive(Debug, Serialize)]
struct GitHubHookConfig {
    url: String,
    content_type: String,
    secret: String,
}

#[derive(Debug, Serialize)]
struct GitHubStatusRequest {
    state: String,
    target_url: String,
    description: String,
    context: String,
}

#[derive(Debug, Serialize)]
struct GitHubPullRequest {
    title: String,
    body: String,
    head: String,
    base: String,
}

/// GitHub's commit-status vocabulary
fn commit_state(status: CommitStatus) -> &'static str {
    match status {
        CommitStatus::Pass => "success",
        CommitStatus::Fail => "failure",
        CommitStatus::Error => "error",
        CommitStatus::InProgress => "pending",
    }
}

/// Map generic events to GitHub event names
///
/// Both PR events collapse onto GitHub's single `pull_request` event.
fn hook_events(events: &[WebhookEvent]) -> Vec<String> {
    let mut names = Vec::with_capacity(events.len());
    for event in events {
        match event {
            WebhookEvent::PrCreated | WebhookEvent::PrEdited => {
                names.push("pull_request".to_string())
            }
            WebhookEvent::Push => names.push("push".to_string()),
        }
    }
    names
}

fn hook_request(payload_url: &str, secret: &str, events: &[WebhookEvent]) -> GitHubHookRequest {
    GitHubHookRequest {
        events: hook_events(events),
        config: GitHubHookConfig {
            url: payload_url.to_string(),
            content_type: "json".to_string(),
            secret: secret.to_string(),
        },
    }
}

fn parse_webhook_id(webhook_id: &str) -> Result<i64> {
    webhook_id.parse().map_err(|_| {
        ForgeLinkError::Parse(format!(
            "Webhook id '{}' is not a numeric GitHub hook id",
            webhook_id
        ))
    })
}

/// Last page number advertised by the `Link` response header, 0 when absent
fn last_page(headers: &header::HeaderMap) -> u32 {
    let Some(link) = headers.get(header::LINK).and_then(|v| v.to_str().ok()) else {
        return 0;
    };
    for part in link.split(',') {
        let Some((target, params)) = part.split_once(';') else {
            continue;
        };
        if !params.contains("rel=\"last\"") {
            continue;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        if let Ok(url) = url::Url::parse(target) {
            if let Some((_, page)) = url.query_pairs().find(|(key, _)| key == "page") {
                return page.parse().unwrap_or(0);
            }
        }
    }
    0
}

fn map_commit(commit: GitHubCommit) -> CommitInfo {
    let GitHubCommit {
        sha,
        url,
        commit: details,
        parents,
    } = commit;
    let author_name = details.author.map(|s| s.name).unwrap_or_default();
    let (committer_name, timestamp) = match details.committer {
        Some(signature) => (
            signature.name,
            signature.date.map(|d| d.timestamp()).unwrap_or_default(),
        ),
        None => (String::new(), 0),
    };
    CommitInfo {
        hash: sha,
        author_name,
        committer_name,
        url,
        timestamp,
        message: details.message,
        parent_hashes: parents.into_iter().map(|p| p.sha).collect(),
    }
}

#[async_trait]
impl VcsClient for GitHubClient {
    async fn test_connection(&self) -> Result<()> {
        let url = format!("{}/zen", self.api_base);
        let response = self
            .authed(self.client.get(&url))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        self.check(response, "connection test").await?;
        Ok(())
    }

    async fn list_repositories(&self) -> Result<HashMap<String, Vec<String>>> {
        let url = format!("{}/user/repos", self.api_base);
        let mut results: HashMap<String, Vec<String>> = HashMap::new();
        let mut page: u32 = 0;
        loop {
            let response = self
                .authed(self.client.get(&url))
                .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
                .timeout(GET_TIMEOUT)
                .send()
                .await?;
            let response = self.check(response, "repository listing").await?;
            let last = last_page(response.headers());
            let repos: Vec<GitHubRepo> = response.json().await?;
            for repo in repos {
                results.entry(repo.owner.login).or_default().push(repo.name);
            }
            if page + 1 >= last {
                break;
            }
            page += 1;
        }
        debug!(owners = results.len(), "GitHub repository listing complete");
        Ok(results)
    }

    async fn list_branches(&self, owner: &str, repository: &str) -> Result<Vec<String>> {
        let url = format!("{}/repos/{}/{}/branches", self.api_base, owner, repository);
        let mut results = Vec::new();
        let mut page: u32 = 0;
        loop {
            let response = self
                .authed(self.client.get(&url))
                .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
                .timeout(GET_TIMEOUT)
                .send()
                .await?;
            let response = self.check(response, "branch listing").await?;
            let last = last_page(response.headers());
            let branches: Vec<GitHubBranch> = response.json().await?;
            results.extend(branches.into_iter().map(|b| b.name));
            if page + 1 >= last {
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

        let url = format!("{}/repos/{}/{}/keys", self.api_base, owner, repository);
        let body = GitHubKeyRequest {
            title: key_name.to_string(),
            key: public_key.to_string(),
            read_only: permission == Permission::ReadOnly,
        };
        let response = self
            .authed(self.client.post(&url).json(&body))
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "deploy key creation").await?;
        info!(owner, repository, key_name, "GitHub deploy key created");
        Ok(())
    }

    async fn create_webhook(
        &self,
        owner: &str,
        repository: &str,
        _branch: &str,
        payload_url: &str,
        events: &[WebhookEvent],
    ) -> Result<WebhookRegistration> {
        let secret = generate_token();
        let body = hook_request(payload_url, &secret, events);
        let url = format!("{}/repos/{}/{}/hooks", self.api_base, owner, repository);
        let response = self
            .authed(self.client.post(&url).json(&body))
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "webhook creation").await?;
        let hook: GitHubHook = response.json().await?;
        info!(owner, repository, id = hook.id, "GitHub webhook created");
        Ok(WebhookRegistration {
            id: hook.id.to_string(),
            secret,
        })
    }

    async fn update_webhook(
        &self,
        owner: &str,
        repository: &str,
        _branch: &str,
        payload_url: &str,
        secret: &str,
        webhook_id: &str,
        events: &[WebhookEvent],
    ) -> Result<()> {
        let id = parse_webhook_id(webhook_id)?;
        let body = hook_request(payload_url, secret, events);
        let url = format!(
            "{}/repos/{}/{}/hooks/{}",
            self.api_base, owner, repository, id
        );
        let response = self
            .authed(self.client.patch(&url).json(&body))
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "webhook update").await?;
        Ok(())
    }

    async fn delete_webhook(&self, owner: &str, repository: &str, webhook_id: &str) -> Result<()> {
        let id = parse_webhook_id(webhook_id)?;
        let url = format!(
            "{}/repos/{}/{}/hooks/{}",
            self.api_base, owner, repository, id
        );
        let response = self
            .authed(self.client.delete(&url))
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
            "{}/repos/{}/{}/statuses/{}",
            self.api_base, owner, repository, reference
        );
        let body = GitHubStatusRequest {
            state: commit_state(status).to_string(),
            target_url: details_url.to_string(),
            description: description.to_string(),
            context: title.to_string(),
        };
        let response = self
            .authed(self.client.post(&url).json(&body))
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "commit status creation").await?;
        debug!(owner, repository, reference, state = body.state.as_str(), "GitHub commit status set");
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
            "{}/repos/{}/{}/tarball/{}",
            self.api_base, owner, repository, branch
        );
        // No request timeout: archive size is unbounded
        let response = self.authed(self.client.get(&url)).send().await?;
        let response = self.check(response, "repository download").await?;
        archive::extract_archive_response(response, local_path).await?;
        info!(
            owner,
            repository,
            branch,
            path = %local_path.display(),
            "GitHub repository archive extracted"
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
        let url = format!("{}/repos/{}/{}/pulls", self.api_base, owner, repository);
        // Head is owner-qualified so cross-fork sources resolve
        let body = GitHubPullRequest {
            title: title.to_string(),
            body: description.to_string(),
            head: format!("{}:{}", owner, source_branch),
            base: target_branch.to_string(),
        };
        let response = self
            .authed(self.client.post(&url).json(&body))
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        self.check(response, "pull request creation").await?;
        info!(owner, repository, source_branch, target_branch, "GitHub pull request opened");
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

        let url = format!("{}/repos/{}/{}/commits", self.api_base, owner, repository);
        let response = self
            .authed(self.client.get(&url))
            .query(&[("sha", branch), ("per_page", "1"), ("page", "1")])
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "latest commit lookup").await?;
        let commits: Vec<GitHubCommit> = response.json().await?;
        Ok(commits
            .into_iter()
            .next()
            .map(map_commit)
            .unwrap_or_default())
    }

    async fn get_repository_info(&self, owner: &str, repository: &str) -> Result<RepositoryInfo> {
        validate_not_blank(&[("owner", owner), ("repository", repository)])?;

        let url = format!("{}/repos/{}/{}", self.api_base, owner, repository);
        let response = self
            .authed(self.client.get(&url))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        let response = self.check(response, "repository lookup").await?;
        let repo: GitHubRepo = response.json().await?;
        Ok(RepositoryInfo {
            clone_info: CloneInfo {
                http: repo.clone_url,
                ssh: repo.ssh_url,
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
            "{}/repos/{}/{}/commits/{}",
            self.api_base, owner, repository, sha
        );
        let response = self
            .authed(self.client.get(&url))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ForgeLinkError::Api(format!(
                "GitHub commit lookup failed: HTTP 404: no commit {} in {}/{}",
                sha, owner, repository
            )));
        }
        let response = self.check(response, "commit lookup").await?;
        Ok(map_commit(response.json().await?))
    }
}
