//! `POST /set_tone`: replace a user's tone profile.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use super::{AppState, Backends};
use crate::store::{StoreError, UserStore};
use crate::types::{GithubUsername, ToneError, ToneProfile, ToneSettings};

#[derive(Debug, Deserialize)]
pub struct SetToneRequest {
    #[serde(default)]
    pub github_username: String,
    #[serde(rename = "toneSettings", default)]
    pub tone_settings: ToneSettings,
}

#[derive(Debug, Serialize)]
pub struct SetToneResponse {
    pub success: bool,
    pub github_username: String,
    #[serde(rename = "toneSettings")]
    pub tone_settings: ToneProfile,
}

#[derive(Debug, Error)]
pub enum ToneRequestError {
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("github_username is required")]
    MissingUsername,

    #[error("invalid tone settings: {0}")]
    Invalid(#[from] ToneError),

    #[error("user {0} not found")]
    UnknownUser(GithubUsername),

    #[error("failed to save tone settings: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ToneRequestError {
    fn into_response(self) -> Response {
        let status = match &self {
            ToneRequestError::Body(_)
            | ToneRequestError::MissingUsername
            | ToneRequestError::Invalid(_) => StatusCode::BAD_REQUEST,
            ToneRequestError::UnknownUser(_) => StatusCode::NOT_FOUND,
            ToneRequestError::Store(e) => {
                error!(error = %e, "Failed to save tone settings");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

pub async fn set_tone_handler<B: Backends>(
    State(app_state): State<AppState<B>>,
    body: Result<Json<SetToneRequest>, JsonRejection>,
) -> Result<Json<SetToneResponse>, ToneRequestError> {
    let Json(request) = body?;

    let username = request.github_username.trim();
    if username.is_empty() {
        return Err(ToneRequestError::MissingUsername);
    }
    let username = GithubUsername::new(username);

    let profile = request.tone_settings.normalize()?;
    if !app_state.store().update_tone(&username, &profile).await? {
        return Err(ToneRequestError::UnknownUser(username));
    }

    info!(%username, "Tone settings updated");
    Ok(Json(SetToneResponse {
        success: true,
        github_username: username.to_string(),
        tone_settings: profile,
    }))
}
