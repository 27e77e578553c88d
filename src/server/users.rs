//! `GET /all_user`: every stored user, for diagnostics.
//!
//! Unauthenticated. Credentials are reduced to a flag.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::{AppState, Backends, ServerError};
use crate::store::UserStore;
use crate::types::{ToneProfile, UserAccount};

#[derive(Debug, Serialize)]
pub struct UserList {
    pub count: usize,
    pub users: Vec<UserView>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub github_username: String,
    #[serde(rename = "hasCredentials")]
    pub has_credentials: bool,
    #[serde(rename = "toneProfile")]
    pub tone_profile: ToneProfile,
    #[serde(rename = "pendingCommits")]
    pub pending_commits: Vec<String>,
}

impl From<UserAccount> for UserView {
    fn from(user: UserAccount) -> Self {
        UserView {
            github_username: user.github_username.to_string(),
            has_credentials: user.credentials.is_some(),
            tone_profile: user.tone,
            pending_commits: user.pending_commits,
        }
    }
}

pub async fn all_users_handler<B: Backends>(
    State(app_state): State<AppState<B>>,
) -> Result<Json<UserList>, ServerError> {
    let users: Vec<UserView> = app_state
        .store()
        .list_users()
        .await?
        .into_iter()
        .map(UserView::from)
        .collect();

    Ok(Json(UserList {
        count: users.len(),
        users,
    }))
}
