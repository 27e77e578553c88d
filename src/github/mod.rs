//! GitHub App access via octocrab.
//!
//! - App (JWT) authentication and installation clients
//! - Commit metadata lookups behind [`CommitSource`]
//! - Transient/permanent error split with exponential backoff

mod client;
mod commits;
mod error;
mod retry;

pub use client::{GitHubApp, GitHubAppError, install_url};
pub use commits::CommitSource;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use retry::{RetryConfig, retry_with_backoff};
