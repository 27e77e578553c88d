//! Webhook ingestion: from a verified delivery to a published post (or a
//! queued commit).
//!
//! Signature checks happen in the HTTP layer before anything here runs.
//! Every path ends in an [`Outcome`]; nothing in this module returns an error.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::completion::CompletionService;
use crate::compose::Composer;
use crate::github::CommitSource;
use crate::publish::PostPublisher;
use crate::queue::WorkQueue;
use crate::store::UserStore;
use crate::types::GithubUsername;
use crate::webhooks::{PushCommit, PushEvent, WebhookEvent, parse_webhook};

/// Commit message markers that suppress posting.
pub const SKIP_MARKERS: [&str; 3] = ["[skip-tweet]", "[no-tweet]", "[skip ci]"];

/// True when the message contains a skip marker (case-sensitive).
pub fn has_skip_marker(message: &str) -> bool {
    SKIP_MARKERS.iter().any(|marker| message.contains(marker))
}

/// What happens to a push for a registered user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Compose and publish a post per push.
    #[default]
    Immediate,
    /// Append the commit to the user's queue for the next sweep.
    Queue,
}

#[derive(Debug, Error)]
#[error("unknown delivery mode {0:?} (expected \"immediate\" or \"queue\")")]
pub struct ParseDeliveryModeError(String);

impl FromStr for DeliveryMode {
    type Err = ParseDeliveryModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(DeliveryMode::Immediate),
            "queue" => Ok(DeliveryMode::Queue),
            _ => Err(ParseDeliveryModeError(s.to_string())),
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Immediate => f.write_str("immediate"),
            DeliveryMode::Queue => f.write_str("queue"),
        }
    }
}

/// Result of handling one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Processed(String),
    /// Nothing to do (unregistered user, skip marker, ignored event).
    Skipped(String),
    /// The delivery itself is unusable.
    Rejected(String),
    /// A downstream call failed.
    Failed(String),
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Outcome::Processed(m)
            | Outcome::Skipped(m)
            | Outcome::Rejected(m)
            | Outcome::Failed(m) => m,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Processed(_) => "processed",
            Outcome::Skipped(_) => "skipped",
            Outcome::Rejected(_) => "rejected",
            Outcome::Failed(_) => "failed",
        }
    }
}

/// Picks whose account a push belongs to: the pusher's name, then the
/// pusher's username, then the latest commit author's username.
pub fn resolve_username(push: &PushEvent, latest: &PushCommit) -> Option<GithubUsername> {
    [
        push.pusher.name.as_deref(),
        push.pusher.username.as_deref(),
        latest.author_username.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|name| !name.is_empty())
    .map(GithubUsername::from)
}

/// Handles deliveries using borrowed backends.
pub struct Ingestor<'a, S, C, P, G> {
    pub store: &'a S,
    pub composer: &'a Composer<C>,
    pub publisher: &'a P,
    pub commits: &'a G,
    pub mode: DeliveryMode,
}

impl<S, C, P, G> Ingestor<'_, S, C, P, G>
where
    S: UserStore,
    C: CompletionService,
    P: PostPublisher,
    G: CommitSource,
{
    /// Parses and handles a delivery whose signature has been verified.
    pub async fn handle_delivery(&self, event_type: &str, payload: &[u8]) -> Outcome {
        match parse_webhook(event_type, payload) {
            Ok(event) => self.handle_event(event).await,
            Err(e) => {
                warn!(event_type, error = %e, "Unparseable webhook payload");
                Outcome::Rejected(format!("Invalid payload: {}", e))
            }
        }
    }

    pub async fn handle_event(&self, event: WebhookEvent) -> Outcome {
        match event {
            WebhookEvent::Push(push) => self.handle_push(push).await,
            WebhookEvent::Installation(installation) => {
                info!(
                    action = %installation.action,
                    installation = %installation.installation,
                    account = installation.account.as_deref().unwrap_or("unknown"),
                    "Installation event"
                );
                Outcome::Processed("Installation event acknowledged".to_string())
            }
            WebhookEvent::Other(event_type) => {
                debug!(event_type = %event_type, "Ignoring event");
                Outcome::Skipped(format!("Event type {} ignored", event_type))
            }
        }
    }

    #[instrument(skip_all, fields(repo = %push.repo))]
    async fn handle_push(&self, push: PushEvent) -> Outcome {
        // Branch deletions and tag pushes arrive without commits.
        let Some(latest) = push.latest_commit() else {
            debug!("Push has no commits");
            return Outcome::Skipped("No commits to process".to_string());
        };

        if has_skip_marker(&latest.message) {
            info!(commit = %latest.id.short(), "Skip marker found");
            return Outcome::Skipped("Commit marked to skip posting".to_string());
        }

        let Some(username) = resolve_username(&push, latest) else {
            warn!("Push has no pusher or author username");
            return Outcome::Rejected("Could not determine GitHub username".to_string());
        };

        let user = match self.store.find_user(&username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!(%username, "User not registered, skipping");
                return Outcome::Skipped(format!("User {} not registered", username));
            }
            Err(e) => {
                error!(%username, error = %e, "User lookup failed");
                return Outcome::Failed(format!("Failed to look up user: {}", e));
            }
        };

        if self.mode == DeliveryMode::Queue {
            return match WorkQueue::new(self.store).enqueue(&username, &latest.message).await {
                Ok(true) => {
                    info!(%username, commit = %latest.id.short(), "Commit queued");
                    Outcome::Processed("Commit queued".to_string())
                }
                Ok(false) => Outcome::Skipped(format!("User {} not registered", username)),
                Err(e) => {
                    error!(%username, error = %e, "Failed to queue commit");
                    Outcome::Failed(format!("Failed to queue commit: {}", e))
                }
            };
        }

        let Some(credentials) = &user.credentials else {
            info!(%username, "No linked social account, skipping");
            return Outcome::Skipped("No linked social account".to_string());
        };

        let mut commit = latest.to_commit_event();
        if let Some(installation) = push.installation {
            match self.commits.fetch_commit(installation, &push.repo, &commit.id).await {
                Ok(details) => commit.enrich(details),
                Err(e) => warn!(commit = %commit.id.short(), error = %e, "Commit lookup failed, continuing without stats"),
            }
        }

        let post = self.composer.compose_single(&commit, &push.repository_name).await;
        match self.publisher.publish(credentials, &post.text).await {
            Ok(post_id) => {
                info!(%username, commit = %commit.id.short(), %post_id, source = ?post.source, "Post published");
                Outcome::Processed("Webhook processed successfully".to_string())
            }
            Err(e) => {
                error!(%username, error = %e, "Failed to publish post");
                Outcome::Failed(format!("Failed to publish post: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        MemoryStore, RecordingPublisher, StubCommits, StubCompletion, arb_commit_message,
        arb_username, push_payload, test_composer,
    };
    use crate::types::{CommitDetails, CommitStats, SocialCredentials, UserAccount};

    struct Fixture {
        store: MemoryStore,
        composer: Composer<StubCompletion>,
        publisher: RecordingPublisher,
        commits: StubCommits,
    }

    impl Fixture {
        fn new(users: impl IntoIterator<Item = UserAccount>) -> Self {
            Fixture {
                store: MemoryStore::with_users(users),
                composer: test_composer(StubCompletion::replying("🚀 shipped")),
                publisher: RecordingPublisher::default(),
                commits: StubCommits::default(),
            }
        }

        fn ingestor(&self, mode: DeliveryMode) -> Ingestor<'_, MemoryStore, StubCompletion, RecordingPublisher, StubCommits> {
            Ingestor {
                store: &self.store,
                composer: &self.composer,
                publisher: &self.publisher,
                commits: &self.commits,
                mode,
            }
        }
    }

    fn linked(name: &str) -> UserAccount {
        UserAccount::new(name).with_credentials(SocialCredentials::new("tok", "sec"))
    }

    #[test]
    fn skip_markers_are_case_sensitive_substrings() {
        assert!(has_skip_marker("fix: thing [skip-tweet]"));
        assert!(has_skip_marker("[no-tweet] wip"));
        assert!(has_skip_marker("chore: bump [skip ci]"));
        assert!(!has_skip_marker("chore: bump [SKIP CI]"));
        assert!(!has_skip_marker("skip-tweet"));
    }

    #[test]
    fn delivery_mode_parsing() {
        assert_eq!("queue".parse::<DeliveryMode>().unwrap(), DeliveryMode::Queue);
        assert_eq!(" Immediate ".parse::<DeliveryMode>().unwrap(), DeliveryMode::Immediate);
        assert!("batch".parse::<DeliveryMode>().is_err());
        assert_eq!(DeliveryMode::default(), DeliveryMode::Immediate);
    }

    #[tokio::test]
    async fn immediate_mode_publishes_once() {
        let fx = Fixture::new([linked("octocat")]);
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &["fix: null pointer"]))
            .await;

        assert_eq!(outcome, Outcome::Processed("Webhook processed successfully".to_string()));
        assert_eq!(fx.publisher.published(), vec![("tok".to_string(), "🚀 shipped".to_string())]);
        assert_eq!(fx.commits.calls(), 1);
    }

    #[tokio::test]
    async fn remote_stats_reach_the_template() {
        let fx = Fixture {
            composer: test_composer(StubCompletion::failing()),
            commits: StubCommits::returning(CommitDetails {
                stats: Some(CommitStats {
                    additions: 10,
                    deletions: 2,
                }),
                author: Some("octocat".to_string()),
            }),
            ..Fixture::new([linked("octocat")])
        };

        fx.ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &["fix: null pointer"]))
            .await;

        let (_, text) = &fx.publisher.published()[0];
        assert!(text.starts_with("🐛 Just pushed to hello-world!"));
        assert!(text.contains("+10/-2 lines"));
    }

    #[tokio::test]
    async fn commit_lookup_failure_is_ignored() {
        let fx = Fixture {
            commits: StubCommits::failing(),
            ..Fixture::new([linked("octocat")])
        };
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &["feat: x"]))
            .await;

        assert!(matches!(outcome, Outcome::Processed(_)));
        assert_eq!(fx.publisher.calls(), 1);
    }

    #[tokio::test]
    async fn queue_mode_enqueues_without_publishing() {
        let fx = Fixture::new([linked("octocat")]);
        let outcome = fx
            .ingestor(DeliveryMode::Queue)
            .handle_delivery("push", &push_payload("octocat", &["feat: one", "feat: two"]))
            .await;

        assert_eq!(outcome, Outcome::Processed("Commit queued".to_string()));
        assert_eq!(fx.store.user("octocat").unwrap().pending_commits, vec!["feat: two"]);
        assert_eq!(fx.publisher.calls(), 0);
        assert_eq!(fx.composer.completion().calls(), 0);
    }

    #[tokio::test]
    async fn queue_mode_does_not_need_credentials() {
        let fx = Fixture::new([UserAccount::new("octocat")]);
        let outcome = fx
            .ingestor(DeliveryMode::Queue)
            .handle_delivery("push", &push_payload("octocat", &["feat: one"]))
            .await;
        assert!(matches!(outcome, Outcome::Processed(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_skipped_without_downstream_calls() {
        let fx = Fixture::new([]);
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("stranger", &["feat: x"]))
            .await;

        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert_eq!(fx.publisher.calls(), 0);
        assert_eq!(fx.commits.calls(), 0);
        assert_eq!(fx.composer.completion().calls(), 0);
    }

    #[tokio::test]
    async fn missing_credentials_skip_in_immediate_mode() {
        let fx = Fixture::new([UserAccount::new("octocat")]);
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &["feat: x"]))
            .await;
        assert_eq!(outcome, Outcome::Skipped("No linked social account".to_string()));
        assert_eq!(fx.publisher.calls(), 0);
    }

    #[tokio::test]
    async fn skip_marker_short_circuits() {
        let fx = Fixture::new([linked("octocat")]);
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &["wip [skip-tweet]"]))
            .await;
        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert_eq!(fx.publisher.calls(), 0);
    }

    #[tokio::test]
    async fn empty_push_is_skipped() {
        let fx = Fixture::new([linked("octocat")]);
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &[]))
            .await;
        assert_eq!(outcome, Outcome::Skipped("No commits to process".to_string()));
        assert_eq!(fx.publisher.calls(), 0);
    }

    #[tokio::test]
    async fn publish_failure_is_failed() {
        let fx = Fixture {
            publisher: RecordingPublisher::failing(),
            ..Fixture::new([linked("octocat")])
        };
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &["feat: x"]))
            .await;
        let Outcome::Failed(reason) = outcome else {
            panic!("expected failure");
        };
        assert!(reason.starts_with("Failed to publish post: "));
    }

    #[tokio::test]
    async fn store_failure_is_failed() {
        let fx = Fixture::new([linked("octocat")]);
        fx.store.fail_reads();
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", &push_payload("octocat", &["feat: x"]))
            .await;
        assert!(matches!(outcome, Outcome::Failed(_)));
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let fx = Fixture::new([]);
        let outcome = fx
            .ingestor(DeliveryMode::Immediate)
            .handle_delivery("push", b"{")
            .await;
        assert!(matches!(outcome, Outcome::Rejected(_)));
    }

    #[tokio::test]
    async fn other_events_are_acknowledged() {
        let fx = Fixture::new([]);
        let ingestor = fx.ingestor(DeliveryMode::Immediate);

        let outcome = ingestor.handle_delivery("star", b"{}").await;
        assert!(matches!(outcome, Outcome::Skipped(_)));

        let outcome = ingestor
            .handle_delivery(
                "installation",
                br#"{"action":"created","installation":{"id":1,"account":{"login":"acme"}}}"#,
            )
            .await;
        assert!(matches!(outcome, Outcome::Processed(_)));
    }

    proptest::proptest! {
        #[test]
        fn skip_marked_commits_are_never_published(
            username in arb_username(),
            message in arb_commit_message(),
            marker in proptest::sample::select(SKIP_MARKERS.to_vec()),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let fx = Fixture::new([linked(username.as_str())]);
                let message = format!("{} {}", message, marker);
                let outcome = fx
                    .ingestor(DeliveryMode::Immediate)
                    .handle_delivery("push", &push_payload(username.as_str(), &[message.as_str()]))
                    .await;

                assert!(matches!(outcome, Outcome::Skipped(_)));
                assert_eq!(fx.publisher.calls(), 0);
                assert_eq!(fx.store.calls(), 0);
            });
        }
    }

    mod usernames {
        use super::*;
        use crate::types::{CommitSha, RepoId};
        use crate::webhooks::Pusher;

        fn push(name: Option<&str>, username: Option<&str>) -> PushEvent {
            PushEvent {
                repo: RepoId::new("o", "r"),
                repository_name: "r".to_string(),
                repository_url: None,
                installation: None,
                pusher: Pusher {
                    name: name.map(String::from),
                    username: username.map(String::from),
                },
                commits: vec![],
            }
        }

        fn commit(author_username: Option<&str>) -> PushCommit {
            PushCommit {
                id: CommitSha::new("abc"),
                message: "m".to_string(),
                author_name: None,
                author_username: author_username.map(String::from),
                added: vec![],
                modified: vec![],
                removed: vec![],
            }
        }

        #[test]
        fn pusher_name_first() {
            let u = resolve_username(&push(Some("a"), Some("b")), &commit(Some("c")));
            assert_eq!(u, Some(GithubUsername::new("a")));
        }

        #[test]
        fn blank_values_are_skipped() {
            let u = resolve_username(&push(Some("  "), None), &commit(Some("c")));
            assert_eq!(u, Some(GithubUsername::new("c")));
            let u = resolve_username(&push(None, Some("b")), &commit(Some("c")));
            assert_eq!(u, Some(GithubUsername::new("b")));
        }

        #[test]
        fn none_when_nothing_usable() {
            assert_eq!(resolve_username(&push(None, Some("")), &commit(None)), None);
        }
    }
}
