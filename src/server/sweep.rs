//! `POST /cron_post`: runs a sweep on demand (an external scheduler calls it).

use axum::Json;
use axum::extract::State;

use super::{AppState, Backends, ServerError};
use crate::sweep::{SweepReport, run_sweep};

pub async fn cron_post_handler<B: Backends>(
    State(app_state): State<AppState<B>>,
) -> Result<Json<SweepReport>, ServerError> {
    let report = run_sweep(
        app_state.store(),
        app_state.composer(),
        app_state.publisher(),
    )
    .await?;
    Ok(Json(report))
}
