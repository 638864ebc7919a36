//! On-demand anomaly injection

use crate::broadcast;
use crate::error::{AppError, AppResult};
use crate::models::Sample;
use crate::predictor::Predictor;
use crate::registry::ConnectionRegistry;
use crate::source::SampleSource;

/// Force one anomaly-class sample through the broadcast path and return
/// it to the caller.
///
/// The flag is fixed at 1.0 since ground truth is already positive. The
/// payload is returned regardless of how many observers were reachable;
/// with an empty anomaly subset nothing is broadcast and the registry is
/// left untouched.
pub fn inject(
    source: &dyn SampleSource,
    predictor: &dyn Predictor,
    registry: &ConnectionRegistry,
) -> AppResult<Sample> {
    let vector = source.draw_anomaly().ok_or(AppError::NoAnomalies)?;
    let probability = predictor.score(&vector)?;
    let sample = Sample::flagged_anomalous(vector, probability);

    let report = broadcast::deliver(registry, &sample)?;
    tracing::info!(
        probability,
        delivered = report.delivered,
        pruned = report.pruned,
        "anomaly injected"
    );

    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Connection, FeatureVector, FEATURE_COUNT, OUTBOX_CAPACITY};
    use crate::testing::{FailingPredictor, FixedPredictor, StaticSource};

    fn vector() -> FeatureVector {
        FeatureVector::from_values([3.0; FEATURE_COUNT])
    }

    #[test]
    fn injection_flags_positive_even_for_low_scores() {
        let registry = ConnectionRegistry::new();
        let source = StaticSource::anomaly_only(vector());

        let sample = inject(&source, &FixedPredictor(0.2), &registry).unwrap();

        assert_eq!(sample.anomaly, 1.0);
        assert_eq!(sample.probability, 0.2);
    }

    #[test]
    fn injected_payload_is_broadcast_to_all_observers() {
        let registry = ConnectionRegistry::new();
        let (a, mut rx_a) = Connection::channel(OUTBOX_CAPACITY);
        let (b, mut rx_b) = Connection::channel(OUTBOX_CAPACITY);
        registry.register(a);
        registry.register(b);

        let source = StaticSource::anomaly_only(vector());
        let sample = inject(&source, &FixedPredictor(0.7), &registry).unwrap();

        for rx in [&mut rx_a, &mut rx_b] {
            let frame = rx.try_recv().unwrap();
            let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(value["anomaly"].as_f64().unwrap(), 1.0);
        }
        assert_eq!(sample.anomaly, 1.0);
    }

    #[test]
    fn empty_anomaly_subset_is_a_structured_error() {
        let registry = ConnectionRegistry::new();
        let (conn, mut rx) = Connection::channel(OUTBOX_CAPACITY);
        registry.register(conn);

        let source = StaticSource::empty();
        let err = inject(&source, &FixedPredictor(0.5), &registry).unwrap_err();

        assert!(matches!(err, AppError::NoAnomalies));
        // No sends attempted, registry unchanged
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn predictor_failure_surfaces_to_the_caller() {
        let registry = ConnectionRegistry::new();
        let source = StaticSource::anomaly_only(vector());
        let err = inject(&source, &FailingPredictor, &registry).unwrap_err();
        assert!(matches!(err, AppError::Predictor(_)));
    }
}
