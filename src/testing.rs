//! Shared test doubles for the broadcast core

use crate::models::FeatureVector;
use crate::predictor::{Predictor, PredictorError};
use crate::source::SampleSource;

/// Source backed by at most one vector per class.
pub struct StaticSource {
    normal: Option<FeatureVector>,
    anomaly: Option<FeatureVector>,
}

impl StaticSource {
    pub fn empty() -> Self {
        Self { normal: None, anomaly: None }
    }

    pub fn normal_only(vector: FeatureVector) -> Self {
        Self { normal: Some(vector), anomaly: None }
    }

    pub fn anomaly_only(vector: FeatureVector) -> Self {
        Self { normal: None, anomaly: Some(vector) }
    }
}

impl SampleSource for StaticSource {
    fn draw_normal(&self) -> Option<FeatureVector> {
        self.normal
    }

    fn draw_anomaly(&self) -> Option<FeatureVector> {
        self.anomaly
    }
}

/// Predictor that always returns the same probability.
pub struct FixedPredictor(pub f32);

impl Predictor for FixedPredictor {
    fn score(&self, _features: &FeatureVector) -> Result<f32, PredictorError> {
        Ok(self.0)
    }
}

/// Predictor that always fails.
pub struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn score(&self, _features: &FeatureVector) -> Result<f32, PredictorError> {
        Err(PredictorError::Inference("simulated failure".to_string()))
    }
}
