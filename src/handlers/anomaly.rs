//! Anomaly injection handler

use axum::{extract::State, Json};

use crate::injector;
use crate::models::Sample;
use crate::{AppResult, AppState};

/// `POST /introduce_anomaly` — force one anomaly-class sample through
/// the broadcast path and echo it back to the caller.
pub async fn introduce(State(state): State<AppState>) -> AppResult<Json<Sample>> {
    let sample = injector::inject(
        state.source.as_ref(),
        state.predictor.as_ref(),
        &state.registry,
    )?;
    Ok(Json(sample))
}
