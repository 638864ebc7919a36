//! Anomaly scoring
//!
//! The periodic loop and the injector score flows through the
//! [`Predictor`] trait. The production implementation runs an ONNX
//! export of the trained network behind a standard-score scaler whose
//! fitted parameters ship as JSON next to the model.

use std::fs;
use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::models::{FeatureVector, FEATURE_COUNT};

/// Scores a feature vector to an anomaly probability in [0, 1].
pub trait Predictor: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<f32, PredictorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    #[error("scaler error: {0}")]
    Scaler(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model produced no output")]
    EmptyOutput,
}

/// Fitted standardization parameters from training.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl ScalerParams {
    fn load(path: impl AsRef<Path>) -> Result<Self, PredictorError> {
        let content = fs::read_to_string(&path)
            .map_err(|e| PredictorError::Scaler(format!("read failed: {e}")))?;
        let params: Self = serde_json::from_str(&content)
            .map_err(|e| PredictorError::Scaler(format!("parse failed: {e}")))?;
        if params.mean.len() != FEATURE_COUNT || params.scale.len() != FEATURE_COUNT {
            return Err(PredictorError::Scaler(format!(
                "expected {FEATURE_COUNT} parameters, found {}/{}",
                params.mean.len(),
                params.scale.len()
            )));
        }
        Ok(params)
    }

    fn transform(&self, features: &[f32; FEATURE_COUNT]) -> [f32; FEATURE_COUNT] {
        let mut standardized = [0.0f32; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let scale = self.scale[i].max(1e-8);
            standardized[i] = (features[i] - self.mean[i]) / scale;
        }
        standardized
    }
}

/// ONNX-backed predictor. The session requires exclusive access per
/// inference, so it sits behind a mutex.
#[derive(Debug)]
pub struct OnnxPredictor {
    session: Mutex<Session>,
    scaler: ScalerParams,
}

impl OnnxPredictor {
    pub fn load(model_path: &str, scaler_path: &str) -> Result<Self, PredictorError> {
        if !Path::new(model_path).exists() {
            return Err(PredictorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()
            .map_err(|e| PredictorError::ModelLoad(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PredictorError::ModelLoad(format!("optimization: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| PredictorError::ModelLoad(e.to_string()))?;

        let scaler = ScalerParams::load(scaler_path)?;

        tracing::info!(model = model_path, "ONNX model loaded");

        Ok(Self {
            session: Mutex::new(session),
            scaler,
        })
    }
}

impl Predictor for OnnxPredictor {
    fn score(&self, features: &FeatureVector) -> Result<f32, PredictorError> {
        let standardized = self.scaler.transform(features.as_array());

        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), standardized.to_vec())
            .map_err(|e| PredictorError::Inference(format!("array error: {e}")))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| PredictorError::Inference(format!("tensor error: {e}")))?;

        let mut session = self.session.lock();
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| PredictorError::Inference("no output defined".to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PredictorError::Inference(e.to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or(PredictorError::EmptyOutput)?;
        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictorError::Inference(format!("extract error: {e}")))?;

        let raw = output_tensor.1.first().copied().ok_or(PredictorError::EmptyOutput)?;
        Ok(raw.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn scaler_standardizes_features() {
        let scaler = ScalerParams {
            mean: vec![2.0; FEATURE_COUNT],
            scale: vec![4.0; FEATURE_COUNT],
        };
        let out = scaler.transform(&[10.0; FEATURE_COUNT]);
        assert_eq!(out, [2.0; FEATURE_COUNT]);
    }

    #[test]
    fn scaler_guards_against_zero_scale() {
        let scaler = ScalerParams {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![0.0; FEATURE_COUNT],
        };
        let out = scaler.transform(&[1.0; FEATURE_COUNT]);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn scaler_load_rejects_wrong_width() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mean": [0.0, 1.0], "scale": [1.0, 1.0]}}"#).unwrap();
        let err = ScalerParams::load(file.path()).unwrap_err();
        assert!(matches!(err, PredictorError::Scaler(_)));
    }

    #[test]
    fn missing_model_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.onnx");
        let err = OnnxPredictor::load(missing.to_str().unwrap(), "scaler.json").unwrap_err();
        assert!(matches!(err, PredictorError::ModelNotFound(_)));
    }
}
