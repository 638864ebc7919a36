//! Scored telemetry sample and the fixed feature schema

use chrono::{DateTime, Utc};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// Number of features in the flow vector
pub const FEATURE_COUNT: usize = 18;

/// Probability above which a scored flow is flagged anomalous
pub const ANOMALY_THRESHOLD: f32 = 0.9;

/// Feature names in exact order they appear in the vector.
/// This is the single source of truth for the wire schema — the
/// `sample` array and the `features` object both follow it.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Seq",
    "Dur",
    "sHops",
    "dHops",
    "SrcPkts",
    "TotBytes",
    "SrcBytes",
    "Offset",
    "sMeanPktSz",
    "dMeanPktSz",
    "TcpRtt",
    "AckDat",
    "sTtl_",
    "dTtl_",
    "Proto_tcp",
    "Proto_udp",
    "Cause_Status",
    "State_INT",
];

/// One flow observation in schema order.
///
/// Serializes transparently as a plain array of 18 floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<f32>::deserialize(deserializer)?;
        let values: [f32; FEATURE_COUNT] = values
            .try_into()
            .map_err(|v: Vec<f32>| D::Error::invalid_length(v.len(), &"18 feature values"))?;
        Ok(Self { values })
    }
}

/// Immutable snapshot of one scored observation.
///
/// Wire format (field order is part of the contract):
///
/// ```json
/// {
///   "timestamp": "<ISO-8601>",
///   "probability": 0.42,
///   "anomaly": 0.0,
///   "sample": [18 floats],
///   "features": { "Seq": ..., ..., "State_INT": ... }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub probability: f32,
    pub anomaly: f32,
    pub vector: FeatureVector,
}

impl Sample {
    /// Sample for the periodic path: the anomaly flag is derived by
    /// thresholding the predictor's probability.
    pub fn scored(vector: FeatureVector, probability: f32) -> Self {
        let anomaly = if probability > ANOMALY_THRESHOLD { 1.0 } else { 0.0 };
        Self {
            timestamp: Utc::now(),
            probability,
            anomaly,
            vector,
        }
    }

    /// Sample for the injection path: ground truth is already positive,
    /// so the flag is fixed at 1.0 regardless of the score.
    pub fn flagged_anomalous(vector: FeatureVector, probability: f32) -> Self {
        Self {
            timestamp: Utc::now(),
            probability,
            anomaly: 1.0,
            vector,
        }
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Sample", 5)?;
        s.serialize_field("timestamp", &self.timestamp)?;
        s.serialize_field("probability", &self.probability)?;
        s.serialize_field("anomaly", &self.anomaly)?;
        s.serialize_field("sample", &self.vector)?;
        s.serialize_field("features", &NamedFeatures(&self.vector))?;
        s.end()
    }
}

/// Emits the vector as a name→value object in schema order.
struct NamedFeatures<'a>(&'a FeatureVector);

impl Serialize for NamedFeatures<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in FEATURE_NAMES.iter().zip(self.0.as_slice()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector() -> FeatureVector {
        let mut values = [0.0f32; FEATURE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f32;
        }
        FeatureVector::from_values(values)
    }

    #[test]
    fn anomaly_flag_derived_from_threshold() {
        assert_eq!(Sample::scored(vector(), 0.0).anomaly, 0.0);
        assert_eq!(Sample::scored(vector(), 0.89).anomaly, 0.0);
        // Boundary: exactly 0.9 is NOT anomalous
        assert_eq!(Sample::scored(vector(), 0.9).anomaly, 0.0);
        assert_eq!(Sample::scored(vector(), 0.9000001).anomaly, 1.0);
        assert_eq!(Sample::scored(vector(), 1.0).anomaly, 1.0);
    }

    #[test]
    fn injected_sample_always_flags_positive() {
        assert_eq!(Sample::flagged_anomalous(vector(), 0.1).anomaly, 1.0);
        assert_eq!(Sample::flagged_anomalous(vector(), 0.99).anomaly, 1.0);
    }

    #[test]
    fn wire_fields_in_contract_order() {
        let json = serde_json::to_string(&Sample::scored(vector(), 0.5)).unwrap();

        let order = ["\"timestamp\"", "\"probability\"", "\"anomaly\"", "\"sample\"", "\"features\""];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "field order broken: {json}");
    }

    #[test]
    fn named_features_follow_schema_order() {
        let json = serde_json::to_string(&Sample::scored(vector(), 0.5)).unwrap();
        let positions: Vec<usize> = FEATURE_NAMES
            .iter()
            .map(|n| json.find(&format!("\"{n}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "feature order broken: {json}");
    }

    #[test]
    fn sample_array_matches_vector() {
        let sample = Sample::scored(vector(), 0.3);
        let value: serde_json::Value = serde_json::to_value(&sample).unwrap();
        let array = value["sample"].as_array().unwrap();
        assert_eq!(array.len(), FEATURE_COUNT);
        assert_eq!(array[2].as_f64().unwrap() as f32, 2.0);
        assert_eq!(value["features"]["sHops"].as_f64().unwrap() as f32, 2.0);
    }

    #[test]
    fn feature_vector_roundtrip() {
        let v = vector();
        let json = serde_json::to_string(&v).unwrap();
        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn feature_vector_rejects_wrong_width() {
        let err = serde_json::from_str::<FeatureVector>("[1.0, 2.0]");
        assert!(err.is_err());
    }
}
