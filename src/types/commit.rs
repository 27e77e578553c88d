//! Commit data carried from a push delivery into post composition.
//!
//! A [`CommitEvent`] is transient: it is built from the webhook payload,
//! optionally enriched with code-host metadata, consumed by the composer and
//! dropped. Only its message text is ever persisted (into a user's queue).

use serde::{Deserialize, Serialize};

use super::ids::CommitSha;

/// Line-level change statistics reported by the code host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
}

/// A single pushed commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    pub id: CommitSha,
    pub message: String,
    pub author: String,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    /// Only present once the commit has been enriched from the code host.
    pub stats: Option<CommitStats>,
}

impl CommitEvent {
    /// Total number of touched paths across added, modified and removed.
    pub fn changed_file_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Merges remote metadata into this commit.
    ///
    /// Remote values win where present; the webhook's own values are kept otherwise.
    pub fn enrich(&mut self, details: CommitDetails) {
        if let Some(stats) = details.stats {
            self.stats = Some(stats);
        }
        if let Some(author) = details.author.filter(|a| !a.trim().is_empty()) {
            self.author = author;
        }
    }
}

/// Metadata fetched from the code host for one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDetails {
    pub stats: Option<CommitStats>,
    /// Canonical author login, falling back to the git author name.
    pub author: Option<String>,
}
