//! Typed representations of the webhook events pushpost handles.
//!
//! - `push` - New commits on a repository; drives post generation
//! - `installation` - The App was installed or removed; acknowledged only
//!
//! Every other event type is carried as [`WebhookEvent::Other`] so the handler
//! can acknowledge it without treating it as an error.

use serde::{Deserialize, Serialize};

use crate::types::{CommitEvent, CommitSha, InstallationId, RepoId};

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Push(PushEvent),
    Installation(InstallationEvent),
    /// An event type we do not act on (the header value is kept for logging).
    Other(String),
}

/// A `push` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub repo: RepoId,

    /// Short repository name (without the owner), used in post text.
    pub repository_name: String,

    pub repository_url: Option<String>,

    /// Present when the delivery came through a GitHub App installation.
    pub installation: Option<InstallationId>,

    pub pusher: Pusher,

    /// Commits in push order; the last one is the most recent.
    pub commits: Vec<PushCommit>,
}

impl PushEvent {
    /// The most recent commit of the push, if any.
    pub fn latest_commit(&self) -> Option<&PushCommit> {
        self.commits.last()
    }
}

/// Who pushed. GitHub fills `name`; `username` only appears in some payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pusher {
    pub name: Option<String>,
    pub username: Option<String>,
}

/// A commit as described inside a push payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCommit {
    pub id: CommitSha,
    pub message: String,
    pub author_name: Option<String>,
    pub author_username: Option<String>,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
}

impl PushCommit {
    /// Builds the transient commit record used for composition.
    pub fn to_commit_event(&self) -> CommitEvent {
        let author = self
            .author_name
            .clone()
            .or_else(|| self.author_username.clone())
            .unwrap_or_else(|| "unknown".to_string());

        CommitEvent {
            id: self.id.clone(),
            message: self.message.clone(),
            author,
            added: self.added.clone(),
            modified: self.modified.clone(),
            removed: self.removed.clone(),
            stats: None,
        }
    }
}

/// An `installation` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationEvent {
    /// e.g. "created", "deleted", "suspend".
    pub action: String,
    pub installation: InstallationId,
    pub account: Option<String>,
}
