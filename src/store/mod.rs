//! Persistent user accounts: credentials, tone profile and commit queue.
//!
//! [`UserStore`] is the seam the rest of the crate talks to;
//! [`PgUserStore`] is the Postgres implementation.

mod postgres;

use std::future::Future;

use thiserror::Error;

use crate::types::{GithubUsername, ToneProfile, UserAccount};

pub use postgres::{PgUserStore, SCHEMA};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode tone profile: {0}")]
    Encode(#[from] serde_json::Error),

    /// Used by non-database stores.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations on user accounts.
///
/// Methods that target one user report whether the user exists rather than
/// failing, so callers decide how to treat unknown usernames.
pub trait UserStore: Send + Sync {
    fn find_user(
        &self,
        username: &GithubUsername,
    ) -> impl Future<Output = Result<Option<UserAccount>, StoreError>> + Send;

    /// All users, ordered by username.
    fn list_users(&self) -> impl Future<Output = Result<Vec<UserAccount>, StoreError>> + Send;

    fn count_users(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Appends to the user's queue. Returns `false` when the user does not exist.
    fn append_commit(
        &self,
        username: &GithubUsername,
        message: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Queued messages, oldest first. Unknown users have an empty queue.
    fn pending_commits(
        &self,
        username: &GithubUsername,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Empties the queue and sets `tone.keywords` to null, atomically.
    ///
    /// A missing or unreadable profile is replaced by a complete default.
    fn clear_queue_and_reset_keywords(
        &self,
        username: &GithubUsername,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn clear_queue_only(
        &self,
        username: &GithubUsername,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replaces the tone profile. Returns `false` when the user does not exist.
    fn update_tone(
        &self,
        username: &GithubUsername,
        tone: &ToneProfile,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Round-trips to the backend.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
