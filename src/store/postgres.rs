//! Postgres-backed [`UserStore`].
//!
//! Queries are built at runtime (no compile-time database). Every call checks
//! a connection out of the pool for the duration of one statement, except the
//! sweep clear, which holds one for a short row-locking transaction.

use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::{debug, warn};

use crate::types::{GithubUsername, SocialCredentials, ToneProfile, UserAccount};

use super::{StoreError, UserStore};

/// Table definition. Applied idempotently at startup.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS x_credentials (
    github_username TEXT PRIMARY KEY,
    access_token    TEXT,
    access_secret   TEXT,
    tone_profile    JSONB,
    commits         TEXT[] NOT NULL DEFAULT '{}'
)"#;

const SELECT_USER_COLUMNS: &str =
    "SELECT github_username, access_token, access_secret, tone_profile, commits FROM x_credentials";

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the table if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    github_username: String,
    access_token: Option<String>,
    access_secret: Option<String>,
    tone_profile: Option<Value>,
    commits: Option<Vec<String>>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        let tone = parse_tone(&row.github_username, row.tone_profile);
        UserAccount {
            credentials: SocialCredentials::from_columns(row.access_token, row.access_secret),
            tone,
            pending_commits: row.commits.unwrap_or_default(),
            github_username: GithubUsername::new(row.github_username),
        }
    }
}

/// Reads a stored profile. Older rows hold the JSON as a string; unreadable
/// profiles degrade to the defaults.
fn parse_tone(username: &str, stored: Option<Value>) -> ToneProfile {
    let value = match stored {
        None | Some(Value::Null) => return ToneProfile::default(),
        Some(Value::String(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(username, error = %e, "Stored tone profile is not JSON, using defaults");
                return ToneProfile::default();
            }
        },
        Some(value) => value,
    };

    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(username, error = %e, "Stored tone profile is invalid, using defaults");
        ToneProfile::default()
    })
}

/// The profile written back after a sweep: whatever was stored, read the same
/// way as [`parse_tone`], with the one-shot keywords dropped.
fn swept_tone(username: &str, stored: Option<Value>) -> ToneProfile {
    parse_tone(username, stored).without_keywords()
}

impl UserStore for PgUserStore {
    async fn find_user(&self, username: &GithubUsername) -> Result<Option<UserAccount>, StoreError> {
        let sql = format!("{} WHERE github_username = $1", SELECT_USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserAccount::from))
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        let sql = format!("{} ORDER BY github_username", SELECT_USER_COLUMNS);
        let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(UserAccount::from).collect())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM x_credentials")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn append_commit(&self, username: &GithubUsername, message: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE x_credentials \
             SET commits = array_append(COALESCE(commits, '{}'), $2) \
             WHERE github_username = $1",
        )
        .bind(username.as_str())
        .bind(message)
        .execute(&self.pool)
        .await?;
        debug!(%username, appended = result.rows_affected() > 0, "Append commit");
        Ok(result.rows_affected() > 0)
    }

    async fn pending_commits(&self, username: &GithubUsername) -> Result<Vec<String>, StoreError> {
        let row: Option<(Option<Vec<String>>,)> =
            sqlx::query_as("SELECT commits FROM x_credentials WHERE github_username = $1")
                .bind(username.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.and_then(|(commits,)| commits).unwrap_or_default())
    }

    async fn clear_queue_and_reset_keywords(&self, username: &GithubUsername) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let stored: Option<(Option<Value>,)> = sqlx::query_as(
            "SELECT tone_profile FROM x_credentials WHERE github_username = $1 FOR UPDATE",
        )
        .bind(username.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((stored,)) = stored else {
            tx.commit().await?;
            return Ok(());
        };

        let tone = swept_tone(username.as_str(), stored);
        sqlx::query(
            "UPDATE x_credentials SET commits = '{}', tone_profile = $2 WHERE github_username = $1",
        )
        .bind(username.as_str())
        .bind(Json(&tone))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn clear_queue_only(&self, username: &GithubUsername) -> Result<(), StoreError> {
        sqlx::query("UPDATE x_credentials SET commits = '{}' WHERE github_username = $1")
            .bind(username.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_tone(&self, username: &GithubUsername, tone: &ToneProfile) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE x_credentials SET tone_profile = $2 WHERE github_username = $1")
                .bind(username.as_str())
                .bind(Json(tone))
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
