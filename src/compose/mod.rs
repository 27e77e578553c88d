//! Turning commits into post text.
//!
//! - [`classify`] - commit message to [`CommitCategory`]
//! - [`prompt`] - instruction prompts for the text generator
//! - [`fallback`] - deterministic templates
//! - [`Composer`] - tries generation, falls back to templates

pub mod classify;
mod composer;
pub mod fallback;
pub mod prompt;

pub use classify::{CommitCategory, classify};
pub use composer::{ComposedPost, Composer, PostSource};
pub use fallback::{
    CommitSummary, MAX_BATCH_CHARS, MAX_POST_CHARS, fallback_batch, fallback_single,
    truncate_with_ellipsis,
};
