//! X (Twitter) API v2 publisher.
//!
//! App keys come from configuration; user tokens come from each account's
//! stored credentials, so every request is signed for the posting user.

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{PostId, SocialCredentials};

use super::oauth::{OAuthKeys, authorization_header};
use super::{PostPublisher, PublishError};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

#[derive(Clone)]
pub struct TwitterPublisher {
    http: reqwest::Client,
    consumer_key: String,
    consumer_secret: String,
    base_url: String,
}

impl TwitterPublisher {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn tweets_url(&self) -> String {
        format!("{}/2/tweets", self.base_url)
    }

    fn keys<'a>(&'a self, credentials: &'a SocialCredentials) -> OAuthKeys<'a> {
        OAuthKeys {
            consumer_key: &self.consumer_key,
            consumer_secret: &self.consumer_secret,
            token: credentials.access_token(),
            token_secret: credentials.access_secret(),
        }
    }
}

impl std::fmt::Debug for TwitterPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterPublisher")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: Option<CreatedTweet>,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn post_id(response: CreateTweetResponse) -> Result<PostId, PublishError> {
    response
        .data
        .map(|d| d.id)
        .filter(|id| !id.is_empty())
        .map(PostId::new)
        .ok_or(PublishError::MalformedResponse)
}

impl PostPublisher for TwitterPublisher {
    async fn publish(
        &self,
        credentials: &SocialCredentials,
        text: &str,
    ) -> Result<PostId, PublishError> {
        let url = self.tweets_url();
        let authorization = authorization_header(
            self.keys(credentials),
            "POST",
            &url,
            &[],
            &nonce(),
            chrono::Utc::now().timestamp(),
        );

        debug!(chars = text.chars().count(), "Publishing post");
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&CreateTweet { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let id = post_id(response.json().await?)?;
        info!(post_id = %id, "Post published");
        Ok(id)
    }
}
