//! Commit metadata lookups.

use std::future::Future;

use serde::Deserialize;

use crate::types::{CommitDetails, CommitSha, CommitStats, InstallationId, RepoId};

use super::client::GitHubApp;
use super::error::GitHubApiError;
use super::retry::retry_with_backoff;

/// Fetches per-commit metadata that push payloads leave out.
pub trait CommitSource: Send + Sync {
    fn fetch_commit(
        &self,
        installation: InstallationId,
        repo: &RepoId,
        sha: &CommitSha,
    ) -> impl Future<Output = Result<CommitDetails, GitHubApiError>> + Send;
}

// ─── REST response ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawCommit {
    stats: Option<RawStats>,
    author: Option<RawUser>,
    commit: Option<RawGitCommit>,
}

#[derive(Debug, Deserialize)]
struct RawStats {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGitCommit {
    author: Option<RawGitAuthor>,
}

#[derive(Debug, Deserialize)]
struct RawGitAuthor {
    name: Option<String>,
}

impl From<RawCommit> for CommitDetails {
    fn from(raw: RawCommit) -> Self {
        let login = raw.author.and_then(|a| a.login);
        let name = raw.commit.and_then(|c| c.author).and_then(|a| a.name);
        CommitDetails {
            stats: raw.stats.map(|s| CommitStats {
                additions: s.additions,
                deletions: s.deletions,
            }),
            author: login.or(name),
        }
    }
}

fn commit_route(repo: &RepoId, sha: &CommitSha) -> String {
    format!("/repos/{}/{}/commits/{}", repo.owner, repo.repo, sha)
}

impl CommitSource for GitHubApp {
    async fn fetch_commit(
        &self,
        installation: InstallationId,
        repo: &RepoId,
        sha: &CommitSha,
    ) -> Result<CommitDetails, GitHubApiError> {
        let client = self.installation_client(installation).await?;
        let route = commit_route(repo, sha);

        let raw: RawCommit = retry_with_backoff(self.retry, || async {
            client
                .get::<RawCommit, _, ()>(&route, None::<&()>)
                .await
                .map_err(GitHubApiError::from_octocrab)
        })
        .await?;

        Ok(raw.into())
    }
}
