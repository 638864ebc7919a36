//! Periodic telemetry production

use crate::broadcast;
use crate::models::Sample;
use crate::predictor::{Predictor, PredictorError};
use crate::registry::ConnectionRegistry;
use crate::source::SampleSource;
use crate::AppState;

#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("no normal-class samples available")]
    EmptySource,
    #[error(transparent)]
    Predictor(#[from] PredictorError),
    #[error("failed to encode sample: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Run the production loop until the process exits.
///
/// The delay is measured from the end of one delivery to the start of
/// the next draw; a failed tick is logged and skipped, never fatal.
pub async fn run(state: AppState) {
    let interval = state.config.tick_interval();
    tracing::info!(interval_ms = interval.as_millis() as u64, "telemetry producer started");

    loop {
        if let Err(err) = tick(
            state.source.as_ref(),
            state.predictor.as_ref(),
            &state.registry,
        ) {
            tracing::warn!(error = %err, "tick skipped");
        }
        tokio::time::sleep(interval).await;
    }
}

/// One production tick: draw a normal-class flow, score it, broadcast
/// the resulting sample to a fresh registry snapshot.
pub fn tick(
    source: &dyn SampleSource,
    predictor: &dyn Predictor,
    registry: &ConnectionRegistry,
) -> Result<Sample, TickError> {
    let vector = source.draw_normal().ok_or(TickError::EmptySource)?;
    let probability = predictor.score(&vector)?;
    let sample = Sample::scored(vector, probability);

    let report = broadcast::deliver(registry, &sample)?;
    tracing::debug!(
        probability,
        anomaly = sample.anomaly,
        delivered = report.delivered,
        pruned = report.pruned,
        "telemetry tick"
    );

    Ok(sample)
}
