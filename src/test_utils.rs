//! Shared test doubles and arbitrary generators for property-based testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

use crate::completion::{CompletionError, CompletionService};
use crate::compose::Composer;
use crate::github::{CommitSource, GitHubApiError};
use crate::publish::{PostPublisher, PublishError};
use crate::server::Backends;
use crate::store::{StoreError, UserStore};
use crate::types::{
    CallToAction, CommitDetails, CommitSha, GithubUsername, InstallationId, PostId, RepoId,
    SocialCredentials, ToneProfile, UserAccount,
};

// ─── Store ────────────────────────────────────────────────────────────────────

/// In-memory [`UserStore`] with switchable failures and a call counter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<BTreeMap<String, UserAccount>>,
    fail_reads: AtomicBool,
    fail_combined_clear: AtomicBool,
    fail_queue_clear: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn with_users(users: impl IntoIterator<Item = UserAccount>) -> Self {
        let store = MemoryStore::default();
        {
            let mut map = store.users.lock().unwrap();
            for user in users {
                map.insert(user.github_username.to_string(), user);
            }
        }
        store
    }

    /// Snapshot of one user, bypassing the call counter.
    pub fn user(&self, name: &str) -> Option<UserAccount> {
        self.users.lock().unwrap().get(name).cloned()
    }

    /// Makes every read (find, list, count, pending, ping) fail.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_combined_clear(&self) {
        self.fail_combined_clear.store(true, Ordering::SeqCst);
    }

    pub fn fail_queue_clear(&self) {
        self.fail_queue_clear.store(true, Ordering::SeqCst);
    }

    /// Number of trait calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{} failed", what)))
        } else {
            Ok(())
        }
    }
}

impl UserStore for MemoryStore {
    async fn find_user(&self, username: &GithubUsername) -> Result<Option<UserAccount>, StoreError> {
        self.enter();
        Self::check(&self.fail_reads, "find_user")?;
        Ok(self.user(username.as_str()))
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        self.enter();
        Self::check(&self.fail_reads, "list_users")?;
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        self.enter();
        Self::check(&self.fail_reads, "count_users")?;
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn append_commit(&self, username: &GithubUsername, message: &str) -> Result<bool, StoreError> {
        self.enter();
        let mut users = self.users.lock().unwrap();
        Ok(match users.get_mut(username.as_str()) {
            Some(user) => {
                user.pending_commits.push(message.to_string());
                true
            }
            None => false,
        })
    }

    async fn pending_commits(&self, username: &GithubUsername) -> Result<Vec<String>, StoreError> {
        self.enter();
        Self::check(&self.fail_reads, "pending_commits")?;
        Ok(self
            .user(username.as_str())
            .map(|u| u.pending_commits)
            .unwrap_or_default())
    }

    async fn clear_queue_and_reset_keywords(&self, username: &GithubUsername) -> Result<(), StoreError> {
        self.enter();
        Self::check(&self.fail_combined_clear, "clear_queue_and_reset_keywords")?;
        if let Some(user) = self.users.lock().unwrap().get_mut(username.as_str()) {
            user.pending_commits.clear();
            user.tone = user.tone.without_keywords();
        }
        Ok(())
    }

    async fn clear_queue_only(&self, username: &GithubUsername) -> Result<(), StoreError> {
        self.enter();
        Self::check(&self.fail_queue_clear, "clear_queue_only")?;
        if let Some(user) = self.users.lock().unwrap().get_mut(username.as_str()) {
            user.pending_commits.clear();
        }
        Ok(())
    }

    async fn update_tone(&self, username: &GithubUsername, tone: &ToneProfile) -> Result<bool, StoreError> {
        self.enter();
        Ok(match self.users.lock().unwrap().get_mut(username.as_str()) {
            Some(user) => {
                user.tone = tone.clone();
                true
            }
            None => false,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter();
        Self::check(&self.fail_reads, "ping")
    }
}

// ─── Completion ───────────────────────────────────────────────────────────────

/// Completion backend with a canned reply (or a canned failure).
#[derive(Debug, Clone, Default)]
pub struct StubCompletion {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl StubCompletion {
    pub fn replying(text: &str) -> Self {
        StubCompletion {
            reply: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        StubCompletion::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl CompletionService for StubCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().ok_or(CompletionError::Api {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}

/// A composer over `stub` with a fixed template seed.
pub fn test_composer(stub: StubCompletion) -> Composer<StubCompletion> {
    Composer::with_rng(stub, StdRng::seed_from_u64(0x5eed))
}

// ─── Publisher ────────────────────────────────────────────────────────────────

/// Records `(access_token, text)` for every successful publish.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    fail: bool,
    published: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        RecordingPublisher {
            fail: true,
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PostPublisher for RecordingPublisher {
    async fn publish(&self, credentials: &SocialCredentials, text: &str) -> Result<PostId, PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PublishError::Api {
                status: 403,
                message: "duplicate content".to_string(),
            });
        }
        let mut published = self.published.lock().unwrap();
        published.push((credentials.access_token().to_string(), text.to_string()));
        Ok(PostId::new(format!("post-{}", published.len())))
    }
}

// ─── Commit source ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StubCommits {
    fail: bool,
    details: CommitDetails,
    calls: AtomicUsize,
}

impl StubCommits {
    pub fn returning(details: CommitDetails) -> Self {
        StubCommits {
            details,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        StubCommits {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommitSource for StubCommits {
    async fn fetch_commit(
        &self,
        _installation: InstallationId,
        _repo: &RepoId,
        _sha: &CommitSha,
    ) -> Result<CommitDetails, GitHubApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GitHubApiError::permanent_without_source("Not Found"));
        }
        Ok(self.details.clone())
    }
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

pub struct MockBackends;

impl Backends for MockBackends {
    type Store = MemoryStore;
    type Completion = StubCompletion;
    type Publisher = RecordingPublisher;
    type Commits = StubCommits;
}

/// A `push` payload from `username` to `octocat/hello-world` (installation 77),
/// one commit per message, oldest first.
pub fn push_payload(username: &str, messages: &[&str]) -> Vec<u8> {
    let commits: Vec<_> = messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            json!({
                "id": format!("{:040x}", i + 1),
                "message": message,
                "author": { "name": "Mona", "username": username },
                "added": ["src/new.rs"],
                "modified": ["src/lib.rs"],
                "removed": []
            })
        })
        .collect();

    serde_json::to_vec(&json!({
        "ref": "refs/heads/main",
        "repository": {
            "name": "hello-world",
            "full_name": "octocat/hello-world",
            "html_url": "https://github.com/octocat/hello-world",
            "owner": { "name": "octocat", "login": "octocat" }
        },
        "pusher": { "name": username, "email": "mona@example.com" },
        "installation": { "id": 77 },
        "commits": commits
    }))
    .unwrap()
}

// ─── Strategies ───────────────────────────────────────────────────────────────

pub fn arb_username() -> impl Strategy<Value = GithubUsername> {
    "[a-zA-Z0-9][a-zA-Z0-9-]{0,38}".prop_map(GithubUsername::new)
}

pub fn arb_commit_message() -> impl Strategy<Value = String> {
    prop_oneof![
        "(feat|fix|docs|refactor|test|style|chore)(\\([a-z]{1,8}\\))?: [ -~]{0,120}",
        "[ -~]{0,200}",
        ".{0,300}",
    ]
}

pub fn arb_call_to_action() -> impl Strategy<Value = Option<CallToAction>> {
    prop_oneof![
        Just(None),
        Just(Some(CallToAction::Engagement)),
        Just(Some(CallToAction::Follow)),
        Just(Some(CallToAction::Visit)),
        Just(Some(CallToAction::Feedback)),
        Just(Some(CallToAction::Share)),
    ]
}

pub fn arb_tone_profile() -> impl Strategy<Value = ToneProfile> {
    (
        prop::collection::vec("[a-z]{1,12}", 1..4),
        prop::collection::vec("[a-z]{1,12}", 1..4),
        "[a-z ]{1,20}",
        prop::option::of("[a-zA-Z, ]{1,40}"),
        arb_call_to_action(),
    )
        .prop_map(|(tone, style, audience, keywords, call_to_action)| ToneProfile {
            tone,
            style,
            audience,
            keywords,
            call_to_action,
            ..Default::default()
        })
}
