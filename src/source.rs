//! Evaluation dataset access
//!
//! The broadcast core draws labeled flow vectors through the
//! [`SampleSource`] trait so the fixed dataset can later be swapped for
//! a live feature extractor without touching the producer or injector.

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;

use crate::models::{FeatureVector, FEATURE_COUNT};

/// Supplier of labeled feature vectors. Normal-class and anomaly-class
/// draws are separate operations; `None` means the subset is empty.
pub trait SampleSource: Send + Sync {
    fn draw_normal(&self) -> Option<FeatureVector>;
    fn draw_anomaly(&self) -> Option<FeatureVector>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset row {line}: {reason}")]
    BadRow { line: usize, reason: String },
    #[error("dataset contains no rows")]
    Empty,
}

/// Dataset loaded from the evaluation CSV, split by ground-truth label.
///
/// Row layout matches the export: a leading index column, the 18
/// feature columns in schema order, and a trailing 0/1 label.
#[derive(Debug)]
pub struct CsvSampleSource {
    normal: Vec<FeatureVector>,
    anomalous: Vec<FeatureVector>,
}

impl CsvSampleSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path)?;
        let mut normal = Vec::new();
        let mut anomalous = Vec::new();

        // First line is the header
        for (index, row) in content.lines().enumerate().skip(1) {
            if row.trim().is_empty() {
                continue;
            }
            let (vector, is_anomaly) = parse_row(row).map_err(|reason| SourceError::BadRow {
                line: index + 1,
                reason,
            })?;
            if is_anomaly {
                anomalous.push(vector);
            } else {
                normal.push(vector);
            }
        }

        if normal.is_empty() && anomalous.is_empty() {
            return Err(SourceError::Empty);
        }

        Ok(Self { normal, anomalous })
    }

    pub fn normal_count(&self) -> usize {
        self.normal.len()
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalous.len()
    }
}

fn parse_row(row: &str) -> Result<(FeatureVector, bool), String> {
    let columns: Vec<&str> = row.split(',').collect();
    // index + features + label
    if columns.len() != FEATURE_COUNT + 2 {
        return Err(format!(
            "expected {} columns, found {}",
            FEATURE_COUNT + 2,
            columns.len()
        ));
    }

    let mut values = [0.0f32; FEATURE_COUNT];
    for (slot, column) in values.iter_mut().zip(&columns[1..=FEATURE_COUNT]) {
        *slot = column
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("bad feature value {column:?}: {e}"))?;
    }

    let label = columns[FEATURE_COUNT + 1]
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("bad label {:?}: {e}", columns[FEATURE_COUNT + 1]))?;

    Ok((FeatureVector::from_values(values), label > 0.5))
}

impl SampleSource for CsvSampleSource {
    fn draw_normal(&self) -> Option<FeatureVector> {
        self.normal.choose(&mut rand::thread_rng()).copied()
    }

    fn draw_anomaly(&self) -> Option<FeatureVector> {
        self.anomalous.choose(&mut rand::thread_rng()).copied()
    }
}
