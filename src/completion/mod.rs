//! Generative text backends.
//!
//! The composer only needs "prompt in, text out"; [`CompletionService`] is
//! that seam. [`GeminiClient`] is the live implementation, tests substitute
//! stubs.

mod gemini;

use std::future::Future;

use thiserror::Error;

pub use gemini::{DEFAULT_GEMINI_MODEL, GeminiClient};

/// Errors from a completion backend.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("completion API returned no text")]
    EmptyResponse,
}

/// Produces text for a prompt.
///
/// Implementations may clamp their output; callers still validate length.
pub trait CompletionService: Send + Sync {
    fn complete(&self, prompt: &str)
    -> impl Future<Output = Result<String, CompletionError>> + Send;
}
