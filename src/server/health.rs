//! `GET /health`: store connectivity and stored-user count.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::error;

use super::{AppState, Backends};
use crate::store::UserStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub app_id: u64,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_users: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn health_handler<B: Backends>(
    State(app_state): State<AppState<B>>,
) -> (StatusCode, Json<HealthReport>) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let app_id = app_state.settings().app_id;

    match app_state.store().count_users().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthReport {
                status: "OK",
                timestamp,
                app_id,
                database: "Connected",
                stored_users: Some(count),
                error: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthReport {
                    status: "ERROR",
                    timestamp,
                    app_id,
                    database: "Connection failed",
                    stored_users: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
