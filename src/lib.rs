//! pushpost - turns GitHub pushes into social posts.
//!
//! A GitHub App webhook receives pushes, classifies the latest commit, writes
//! a post with a text generator (falling back to templates) and publishes it
//! with the pushing user's linked X account. In queue mode commits are
//! collected per user and summarized by a periodic sweep instead.

pub mod completion;
pub mod compose;
pub mod config;
pub mod github;
pub mod ingest;
pub mod publish;
pub mod queue;
pub mod server;
pub mod store;
pub mod sweep;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
