//! The periodic sweep: one batch post per user with queued commits.
//!
//! Users are processed one after another in store order. A failure for one
//! user is recorded in the report and never stops the sweep.

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::completion::CompletionService;
use crate::compose::Composer;
use crate::publish::PostPublisher;
use crate::queue::WorkQueue;
use crate::store::{StoreError, UserStore};
use crate::types::UserAccount;

pub const NO_COMMITS: &str = "No commits found";
pub const NO_CREDENTIALS: &str = "No linked social account";

/// Result of one sweep, serialized as the `/cron_post` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub summary: SweepSummary,
    pub results: Vec<UserResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub total_users: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResult {
    pub user: String,
    #[serde(flatten)]
    pub status: SweepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SweepStatus {
    Success {
        #[serde(rename = "tweetId")]
        tweet_id: String,
    },
    Failed {
        reason: String,
    },
    Skipped {
        reason: String,
    },
}

impl SweepReport {
    fn from_results(results: Vec<UserResult>) -> Self {
        let mut summary = SweepSummary {
            total_users: results.len(),
            ..Default::default()
        };
        for result in &results {
            match result.status {
                SweepStatus::Success { .. } => summary.successful += 1,
                SweepStatus::Failed { .. } => summary.failed += 1,
                SweepStatus::Skipped { .. } => summary.skipped += 1,
            }
        }
        SweepReport { summary, results }
    }
}

/// Runs one sweep over every stored user.
///
/// Fails only when the user list itself cannot be read.
#[instrument(skip_all)]
pub async fn run_sweep<S, C, P>(
    store: &S,
    composer: &Composer<C>,
    publisher: &P,
) -> Result<SweepReport, StoreError>
where
    S: UserStore,
    C: CompletionService,
    P: PostPublisher,
{
    let users = store.list_users().await?;
    info!(users = users.len(), "Starting sweep");

    let queue = WorkQueue::new(store);
    let mut results = Vec::with_capacity(users.len());
    for user in &users {
        let status = sweep_user(&queue, composer, publisher, user).await;
        results.push(UserResult {
            user: user.github_username.to_string(),
            status,
        });
    }

    let report = SweepReport::from_results(results);
    info!(
        successful = report.summary.successful,
        failed = report.summary.failed,
        skipped = report.summary.skipped,
        "Sweep finished"
    );
    Ok(report)
}

async fn sweep_user<S, C, P>(
    queue: &WorkQueue<'_, S>,
    composer: &Composer<C>,
    publisher: &P,
    user: &UserAccount,
) -> SweepStatus
where
    S: UserStore,
    C: CompletionService,
    P: PostPublisher,
{
    let username = &user.github_username;

    let commits = match queue.drain(username).await {
        Ok(commits) => commits,
        Err(e) => {
            error!(%username, error = %e, "Failed to load queued commits");
            return SweepStatus::Failed {
                reason: format!("Failed to load commits: {}", e),
            };
        }
    };
    if commits.is_empty() {
        return SweepStatus::Skipped {
            reason: NO_COMMITS.to_string(),
        };
    }

    let Some(credentials) = &user.credentials else {
        info!(%username, "No linked social account, skipping");
        return SweepStatus::Skipped {
            reason: NO_CREDENTIALS.to_string(),
        };
    };

    let post = composer.compose_batch(&commits, &user.tone).await;
    let post_id = match publisher.publish(credentials, &post.text).await {
        Ok(id) => id,
        Err(e) => {
            error!(%username, error = %e, "Failed to publish batch post");
            return SweepStatus::Failed {
                reason: format!("Failed to publish post: {}", e),
            };
        }
    };

    // The post is already out; a failed clear only means a repeat next sweep.
    if let Err(e) = queue.clear(username).await {
        warn!(%username, error = %e, "Published but failed to clear queue");
    }

    info!(%username, commits = commits.len(), post_id = %post_id, source = ?post.source, "Batch post published");
    SweepStatus::Success {
        tweet_id: post_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryStore, RecordingPublisher, StubCompletion, test_composer};
    use crate::types::{SocialCredentials, ToneProfile};
    use serde_json::json;

    fn linked(name: &str) -> UserAccount {
        UserAccount::new(name).with_credentials(SocialCredentials::new("t", "s"))
    }

    #[tokio::test]
    async fn mixed_population() {
        let store = MemoryStore::with_users([
            linked("alice").with_pending_commits(["feat: a", "fix: b"]),
            linked("bob"),
            UserAccount::new("carol").with_pending_commits(["docs: c"]),
        ]);
        let composer = test_composer(StubCompletion::replying("Great week!"));
        let publisher = RecordingPublisher::default();

        let report = run_sweep(&store, &composer, &publisher).await.unwrap();

        assert_eq!(
            report.summary,
            SweepSummary {
                total_users: 3,
                successful: 1,
                failed: 0,
                skipped: 2
            }
        );
        assert_eq!(report.results[0].user, "alice");
        assert!(matches!(report.results[0].status, SweepStatus::Success { .. }));
        assert_eq!(
            report.results[1].status,
            SweepStatus::Skipped {
                reason: NO_COMMITS.to_string()
            }
        );
        assert_eq!(
            report.results[2].status,
            SweepStatus::Skipped {
                reason: NO_CREDENTIALS.to_string()
            }
        );

        assert_eq!(publisher.published(), vec![("t".to_string(), "Great week!".to_string())]);
        assert!(store.user("alice").unwrap().pending_commits.is_empty());
        assert_eq!(store.user("carol").unwrap().pending_commits, vec!["docs: c"]);
    }

    #[tokio::test]
    async fn success_resets_keywords() {
        let tone = ToneProfile {
            keywords: Some("launch".to_string()),
            ..Default::default()
        };
        let store = MemoryStore::with_users([linked("alice").with_tone(tone).with_pending_commits(["x"])]);
        let composer = test_composer(StubCompletion::replying("ok"));

        run_sweep(&store, &composer, &RecordingPublisher::default()).await.unwrap();

        assert_eq!(store.user("alice").unwrap().tone.keywords, None);
        assert!(composer.completion().last_prompt().unwrap().contains("launch"));
    }

    #[tokio::test]
    async fn publish_failure_keeps_queue() {
        let store = MemoryStore::with_users([linked("alice").with_pending_commits(["a", "b"])]);
        let composer = test_composer(StubCompletion::replying("ok"));
        let publisher = RecordingPublisher::failing();

        let report = run_sweep(&store, &composer, &publisher).await.unwrap();

        assert_eq!(report.summary.failed, 1);
        let SweepStatus::Failed { reason } = &report.results[0].status else {
            panic!("expected failure");
        };
        assert!(reason.starts_with("Failed to publish post: "));
        assert_eq!(store.user("alice").unwrap().pending_commits, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn clear_failure_after_publish_is_still_success() {
        let store = MemoryStore::with_users([linked("alice").with_pending_commits(["a"])]);
        store.fail_combined_clear();
        store.fail_queue_clear();
        let composer = test_composer(StubCompletion::replying("ok"));

        let report = run_sweep(&store, &composer, &RecordingPublisher::default()).await.unwrap();

        assert_eq!(report.summary.successful, 1);
        assert_eq!(store.user("alice").unwrap().pending_commits, vec!["a"]);
    }

    #[tokio::test]
    async fn completion_failure_still_publishes_template() {
        let store = MemoryStore::with_users([linked("alice").with_pending_commits(["feat: a"])]);
        let composer = test_composer(StubCompletion::failing());
        let publisher = RecordingPublisher::default();

        let report = run_sweep(&store, &composer, &publisher).await.unwrap();

        assert_eq!(report.summary.successful, 1);
        assert!(publisher.published()[0].1.contains("\"feat: a\""));
    }

    #[tokio::test]
    async fn list_failure_fails_the_sweep() {
        let store = MemoryStore::default();
        store.fail_reads();
        let composer = test_composer(StubCompletion::replying("ok"));
        assert!(run_sweep(&store, &composer, &RecordingPublisher::default()).await.is_err());
    }

    #[tokio::test]
    async fn empty_store_gives_empty_report() {
        let store = MemoryStore::default();
        let composer = test_composer(StubCompletion::replying("ok"));
        let report = run_sweep(&store, &composer, &RecordingPublisher::default()).await.unwrap();
        assert_eq!(report.summary, SweepSummary::default());
        assert!(report.results.is_empty());
    }

    #[test]
    fn report_json_shape() {
        let report = SweepReport::from_results(vec![
            UserResult {
                user: "alice".to_string(),
                status: SweepStatus::Success {
                    tweet_id: "123".to_string(),
                },
            },
            UserResult {
                user: "bob".to_string(),
                status: SweepStatus::Skipped {
                    reason: NO_COMMITS.to_string(),
                },
            },
        ]);

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "summary": { "totalUsers": 2, "successful": 1, "failed": 0, "skipped": 1 },
                "results": [
                    { "user": "alice", "status": "success", "tweetId": "123" },
                    { "user": "bob", "status": "skipped", "reason": "No commits found" }
                ]
            })
        );
    }
}
