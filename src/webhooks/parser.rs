//! Webhook payload parser.
//!
//! Turns raw delivery bytes into a typed [`WebhookEvent`]. The event type comes
//! from the `X-GitHub-Event` header; unknown types parse to
//! [`WebhookEvent::Other`] rather than failing. Signatures are checked
//! elsewhere, before this parser ever sees the body.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CommitSha, InstallationId, RepoId};

use super::events::{InstallationEvent, PushCommit, PushEvent, Pusher, WebhookEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field is present but unusable.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a delivery according to its event type.
///
/// ```
/// use pushpost::webhooks::{parse_webhook, WebhookEvent};
///
/// let payload = br#"{
///     "action": "created",
///     "installation": { "id": 42, "account": { "login": "octocat" } }
/// }"#;
///
/// let event = parse_webhook("installation", payload).unwrap();
/// assert!(matches!(event, WebhookEvent::Installation(_)));
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<WebhookEvent, ParseError> {
    match event_type {
        "push" => parse_push(payload).map(WebhookEvent::Push),
        "installation" => parse_installation(payload).map(WebhookEvent::Installation),
        other => Ok(WebhookEvent::Other(other.to_string())),
    }
}

// ============================================================================
// Raw payload structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
    full_name: Option<String>,
    owner: Option<RawAccount>,
    html_url: Option<String>,
}

/// Push payloads describe the owner with `name`, most others with `login`.
#[derive(Debug, Deserialize)]
struct RawAccount {
    login: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInstallationRef {
    id: u64,
}

// ============================================================================
// push event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPushPayload {
    repository: RawRepository,
    #[serde(default)]
    pusher: Option<Pusher>,
    #[serde(default)]
    installation: Option<RawInstallationRef>,
    #[serde(default)]
    commits: Vec<RawPushCommit>,
}

#[derive(Debug, Deserialize)]
struct RawPushCommit {
    id: String,
    message: String,
    author: Option<RawCommitAuthor>,
    #[serde(default)]
    added: Vec<String>,
    #[serde(default)]
    modified: Vec<String>,
    #[serde(default)]
    removed: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommitAuthor {
    name: Option<String>,
    username: Option<String>,
}

fn parse_push(payload: &[u8]) -> Result<PushEvent, ParseError> {
    let raw: RawPushPayload = serde_json::from_slice(payload)?;

    let repo = repo_id(&raw.repository)?;

    let commits = raw
        .commits
        .into_iter()
        .map(|c| {
            let (author_name, author_username) = match c.author {
                Some(a) => (a.name, a.username),
                None => (None, None),
            };
            PushCommit {
                id: CommitSha::new(c.id),
                message: c.message,
                author_name,
                author_username,
                added: c.added,
                modified: c.modified,
                removed: c.removed,
            }
        })
        .collect();

    Ok(PushEvent {
        repo,
        repository_name: raw.repository.name,
        repository_url: raw.repository.html_url,
        installation: raw.installation.map(|i| InstallationId(i.id)),
        pusher: raw.pusher.unwrap_or_default(),
        commits,
    })
}

fn repo_id(repository: &RawRepository) -> Result<RepoId, ParseError> {
    if let Some(full_name) = repository.full_name.as_deref() {
        return RepoId::parse_full_name(full_name).ok_or_else(|| ParseError::InvalidField {
            field: "repository.full_name",
            value: full_name.to_string(),
        });
    }

    let owner = repository
        .owner
        .as_ref()
        .and_then(|o| o.login.clone().or_else(|| o.name.clone()))
        .ok_or_else(|| ParseError::InvalidField {
            field: "repository.owner",
            value: String::new(),
        })?;

    Ok(RepoId::new(owner, repository.name.clone()))
}

// ============================================================================
// installation event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawInstallationPayload {
    action: String,
    installation: RawInstallation,
}

#[derive(Debug, Deserialize)]
struct RawInstallation {
    id: u64,
    account: Option<RawAccount>,
}

fn parse_installation(payload: &[u8]) -> Result<InstallationEvent, ParseError> {
    let raw: RawInstallationPayload = serde_json::from_slice(payload)?;

    Ok(InstallationEvent {
        action: raw.action,
        installation: InstallationId(raw.installation.id),
        account: raw
            .installation
            .account
            .and_then(|a| a.login.or(a.name)),
    })
}
