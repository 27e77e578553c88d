//! `POST /webhook`.
//!
//! The signature is checked against the raw body before anything is parsed or
//! any backend is touched.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AppState, Backends};
use crate::ingest::Outcome;
use crate::types::DeliveryId;
use crate::webhooks::verify_signature;

const HEADER_EVENT: &str = "x-github-event";
const HEADER_DELIVERY: &str = "x-github-delivery";
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Failures before a delivery reaches ingestion.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing signature")]
    MissingSignature,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("missing required header: {0}")]
    MissingHeader(&'static str),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = match self {
            Outcome::Processed(_) | Outcome::Skipped(_) => StatusCode::OK,
            Outcome::Rejected(_) => StatusCode::BAD_REQUEST,
            Outcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "status": self.label(), "message": self.message() });
        (status, Json(body)).into_response()
    }
}

/// Webhook handler.
///
/// - 200: processed, or skipped (empty push, unregistered user, skip marker, other event)
/// - 400: missing event header or unusable payload
/// - 401: missing or invalid signature
/// - 500: a downstream call failed
pub async fn webhook_handler<B: Backends>(
    State(app_state): State<AppState<B>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Outcome, WebhookError> {
    let delivery_id = header(&headers, HEADER_DELIVERY).map(DeliveryId::new);

    let Some(signature) = header(&headers, HEADER_SIGNATURE) else {
        warn!(delivery_id = ?delivery_id, "Webhook without signature");
        return Err(WebhookError::MissingSignature);
    };
    if !verify_signature(&body, signature, &app_state.settings().webhook_secret) {
        warn!(delivery_id = ?delivery_id, "Invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let event_type =
        header(&headers, HEADER_EVENT).ok_or(WebhookError::MissingHeader(HEADER_EVENT))?;
    debug!(delivery_id = ?delivery_id, event_type, "Received webhook");

    let outcome = app_state.ingestor().handle_delivery(event_type, &body).await;
    info!(
        delivery_id = ?delivery_id,
        event_type,
        outcome = outcome.label(),
        message = outcome.message(),
        "Webhook handled"
    );
    Ok(outcome)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
