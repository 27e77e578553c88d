//! Publishing posts to a user's social account.

mod oauth;
mod twitter;

use std::future::Future;

use thiserror::Error;

use crate::types::{PostId, SocialCredentials};

pub use oauth::{OAuthKeys, authorization_header, signature_base_string};
pub use twitter::TwitterPublisher;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("social API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("social API response had no post id")]
    MalformedResponse,
}

/// Publishes text on behalf of one user.
pub trait PostPublisher: Send + Sync {
    fn publish(
        &self,
        credentials: &SocialCredentials,
        text: &str,
    ) -> impl Future<Output = Result<PostId, PublishError>> + Send;
}
