//! Stored user accounts.

use std::fmt;

use super::ids::GithubUsername;
use super::tone::ToneProfile;

/// A user's linked social-network access pair.
///
/// `Debug` is redacted so credentials never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SocialCredentials {
    access_token: String,
    access_secret: String,
}

impl SocialCredentials {
    pub fn new(access_token: impl Into<String>, access_secret: impl Into<String>) -> Self {
        SocialCredentials {
            access_token: access_token.into(),
            access_secret: access_secret.into(),
        }
    }

    /// Builds credentials from nullable store columns.
    ///
    /// Returns `None` unless both halves are present and non-blank.
    pub fn from_columns(token: Option<String>, secret: Option<String>) -> Option<Self> {
        match (token, secret) {
            (Some(t), Some(s)) if !t.trim().is_empty() && !s.trim().is_empty() => {
                Some(SocialCredentials::new(t, s))
            }
            _ => None,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn access_secret(&self) -> &str {
        &self.access_secret
    }
}

impl fmt::Debug for SocialCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocialCredentials")
            .field("access_token", &"<redacted>")
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

/// One row of the user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub github_username: GithubUsername,
    /// `None` when the user never linked a social account.
    pub credentials: Option<SocialCredentials>,
    pub tone: ToneProfile,
    /// Commit messages awaiting the next sweep, oldest first.
    pub pending_commits: Vec<String>,
}

impl UserAccount {
    pub fn new(github_username: impl Into<GithubUsername>) -> Self {
        UserAccount {
            github_username: github_username.into(),
            credentials: None,
            tone: ToneProfile::default(),
            pending_commits: Vec::new(),
        }
    }

    pub fn with_credentials(mut self, credentials: SocialCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_tone(mut self, tone: ToneProfile) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_pending_commits<I, S>(mut self, commits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending_commits = commits.into_iter().map(Into::into).collect();
        self
    }
}
