//! Webhook handling for GitHub App deliveries.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Typed `push` / `installation` events and their parser

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{InstallationEvent, PushCommit, PushEvent, Pusher, WebhookEvent};
pub use parser::{ParseError, parse_webhook};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
