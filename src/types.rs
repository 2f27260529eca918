//! Provider-neutral domain model
//!
//! Every value handed back to a caller comes from this module. Adapters map
//! their platform's wire shapes into these types; no platform field names or
//! raw wire enums escape an adapter.

use serde::{Deserialize, Serialize};

/// A single commit, normalized across providers
///
/// The `Default` value is the documented "empty commit" returned by
/// [`crate::client::VcsClient::get_latest_commit`] for a branch with no
/// commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit SHA (or platform equivalent)
    pub hash: String,
    /// Author display name
    pub author_name: String,
    /// Committer display name
    pub committer_name: String,
    /// Canonical URL of the commit on the platform
    pub url: String,
    /// Committer date as a UTC unix timestamp
    pub timestamp: i64,
    /// Full commit message
    pub message: String,
    /// Parent SHAs, in platform order
    pub parent_hashes: Vec<String>,
}

/// Repository metadata exposed to callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub clone_info: CloneInfo,
}

/// Clone URLs for a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneInfo {
    /// HTTP(S) clone URL
    pub http: String,
    /// SSH clone URL
    pub ssh: String,
}

/// Outcome recorded against a commit ref
///
/// Each adapter owns a private, total mapping from these values to its
/// platform's status vocabulary; the mappings are not symmetric across
/// platforms (GitLab collapses `Fail` and `Error` to one wire value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Pass,
    Fail,
    Error,
    InProgress,
}

/// Generic webhook event, mapped per adapter to platform event identifiers
///
/// Multiple generic events may collapse onto one platform identifier:
/// GitHub maps both PR events to its single `pull_request` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    /// A pull/merge request was opened
    PrCreated,
    /// A pull/merge request was edited
    PrEdited,
    /// Commits were pushed to a branch
    Push,
}

/// Access level for deploy-key creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

/// Identity of a created webhook
///
/// The `id` is the platform-assigned identifier kept as an opaque string; it
/// round-trips through update/delete calls, which parse it back into the
/// platform's required form internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRegistration {
    pub id: String,
    /// Shared secret the caller must verify against inbound deliveries
    pub secret: String,
}
