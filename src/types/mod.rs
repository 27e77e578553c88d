//! Core domain types for pushpost.
//!
//! Identifiers, commit data, stored user accounts and tone profiles.

pub mod commit;
pub mod ids;
pub mod tone;
pub mod user;

pub use commit::{CommitDetails, CommitEvent, CommitStats};
pub use ids::{CommitSha, DeliveryId, GithubUsername, InstallationId, PostId, RepoId};
pub use tone::{CallToAction, StringList, ToneError, ToneProfile, ToneSettings};
pub use user::{SocialCredentials, UserAccount};
