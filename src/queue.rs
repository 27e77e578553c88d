//! Per-user queue of commit messages awaiting a batch post.
//!
//! A thin layer over [`UserStore`]; the only logic of its own is the clear
//! fallback.

use tracing::warn;

use crate::store::{StoreError, UserStore};
use crate::types::GithubUsername;

/// What [`WorkQueue::clear`] managed to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Queue emptied and the one-shot keywords reset.
    Full,
    /// Queue emptied; the keyword reset failed and was skipped.
    QueueOnly,
}

#[derive(Debug)]
pub struct WorkQueue<'a, S> {
    store: &'a S,
}

impl<'a, S: UserStore> WorkQueue<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Appends a message. Returns `false` when the user is unknown.
    pub async fn enqueue(&self, username: &GithubUsername, message: &str) -> Result<bool, StoreError> {
        self.store.append_commit(username, message).await
    }

    /// Reads the queue without clearing it.
    pub async fn drain(&self, username: &GithubUsername) -> Result<Vec<String>, StoreError> {
        self.store.pending_commits(username).await
    }

    /// Empties the queue, resetting keywords when possible.
    pub async fn clear(&self, username: &GithubUsername) -> Result<ClearOutcome, StoreError> {
        match self.store.clear_queue_and_reset_keywords(username).await {
            Ok(()) => Ok(ClearOutcome::Full),
            Err(e) => {
                warn!(%username, error = %e, "Combined clear failed, clearing queue only");
                self.store.clear_queue_only(username).await?;
                Ok(ClearOutcome::QueueOnly)
            }
        }
    }
}
