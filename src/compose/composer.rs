//! Post composition: generated text first, templates when that fails.
//!
//! The composer never fails. Any backend error, empty reply or over-long reply
//! falls through to the matching template in [`super::fallback`].

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::completion::CompletionService;
use crate::types::{CommitEvent, ToneProfile};

use super::classify::classify;
use super::fallback::{CommitSummary, MAX_POST_CHARS, fallback_batch, fallback_single};
use super::prompt::{batch_prompt, single_commit_prompt};

/// Where a post's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSource {
    Generated,
    Fallback,
}

/// A post ready for publishing (at most [`MAX_POST_CHARS`] characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPost {
    pub text: String,
    pub source: PostSource,
}

impl ComposedPost {
    fn generated(text: String) -> Self {
        Self {
            text,
            source: PostSource::Generated,
        }
    }

    fn fallback(text: String) -> Self {
        Self {
            text,
            source: PostSource::Fallback,
        }
    }
}

/// Composes posts using a completion backend.
pub struct Composer<C> {
    completion: C,
    /// Picks batch templates. Only locked for the synchronous template call.
    rng: Mutex<StdRng>,
}

impl<C: CompletionService> Composer<C> {
    pub fn new(completion: C) -> Self {
        Self::with_rng(completion, StdRng::from_entropy())
    }

    /// Uses the given generator for template selection.
    pub fn with_rng(completion: C, rng: StdRng) -> Self {
        Self {
            completion,
            rng: Mutex::new(rng),
        }
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// Composes a post about a single commit.
    pub async fn compose_single(&self, commit: &CommitEvent, repository: &str) -> ComposedPost {
        let stats = commit.stats.unwrap_or_default();
        let summary = CommitSummary {
            repository: repository.to_string(),
            message: commit.message.clone(),
            author: commit.author.clone(),
            category: classify(&commit.message),
            changed_files: commit.changed_file_count(),
            additions: stats.additions,
            deletions: stats.deletions,
        };

        let prompt = single_commit_prompt(&summary);
        match self.generate(&prompt).await {
            Some(text) => ComposedPost::generated(text),
            None => ComposedPost::fallback(fallback_single(&summary)),
        }
    }

    /// Composes one post summarizing queued commit messages (oldest first).
    pub async fn compose_batch(&self, messages: &[String], tone: &ToneProfile) -> ComposedPost {
        let prompt = batch_prompt(messages, tone);
        if let Some(text) = self.generate(&prompt).await {
            return ComposedPost::generated(text);
        }

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        ComposedPost::fallback(fallback_batch(messages, &mut *rng))
    }

    /// Returns usable generated text, or `None` when the template should be used.
    async fn generate(&self, prompt: &str) -> Option<String> {
        let text = match self.completion.complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Text generation failed, using template");
                return None;
            }
        };

        let text = text.trim();
        let chars = text.chars().count();
        if chars == 0 {
            warn!("Text generation returned nothing, using template");
            return None;
        }
        if chars > MAX_POST_CHARS {
            warn!(chars, "Generated text too long, using template");
            return None;
        }

        debug!(chars, "Using generated text");
        Some(text.to_string())
    }
}

impl<C> std::fmt::Debug for Composer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer").finish_non_exhaustive()
    }
}
