//! Provider Adapters
//!
//! One module per hosting platform, each implementing the full
//! [`crate::client::VcsClient`] contract. Platform wire shapes, pagination
//! styles, and enum vocabularies stay private to their adapter; callers only
//! ever see the domain model.

pub mod github;
pub mod gitlab;

pub use github::GitHubClient;
pub use gitlab::GitLabClient;
