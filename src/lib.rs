//! ForgeLink - Provider-Agnostic Client for Git Hosting Platforms
//!
//! ForgeLink gives CI/CD and policy-automation tooling one trait and one set
//! of domain types for version-control-hosting operations, regardless of
//! which platform a repository lives on. Each adapter translates the generic
//! contract into its platform's REST semantics (pagination, field mapping,
//! enum vocabularies) and returns fully normalized values.
//!
//! # Architecture
//!
//! - **types**: provider-neutral domain model (CommitInfo, RepositoryInfo, ...)
//! - **client**: the `VcsClient` capability trait and `ClientBuilder` factory
//! - **providers**: per-platform adapters (GitHub, GitLab)
//! - **config**: provider selection and credentials (`VcsInfo`, YAML config)
//! - **archive**: streamed tar.gz download staging and extraction
//! - **token**: webhook shared-secret generation
//! - **logging**: optional tracing-subscriber setup for embedding binaries

// Core modules
pub mod client;
pub mod config;
pub mod error;
pub mod types;

// Components
pub mod archive;
pub mod logging;
pub mod providers;
pub mod token;

// Re-exports
pub use client::{ClientBuilder, VcsClient};
pub use config::{VcsConfig, VcsInfo, VcsProvider};
pub use error::{ForgeLinkError, Result};
pub use types::{
    CloneInfo, CommitInfo, CommitStatus, Permission, RepositoryInfo, WebhookEvent,
    WebhookRegistration,
};
