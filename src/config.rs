//! Configuration module

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Delay between telemetry ticks, in milliseconds
    pub tick_interval_ms: u64,

    /// Evaluation dataset (CSV)
    pub dataset_path: String,

    /// ONNX model file
    pub model_path: String,

    /// Scaler parameters (JSON)
    pub scaler_path: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            tick_interval_ms: env::var("TICK_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),

            dataset_path: env::var("DATASET_PATH")
                .unwrap_or_else(|_| "./data/TestData2.csv".to_string()),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "./models/neural_net_model.onnx".to_string()),

            scaler_path: env::var("SCALER_PATH")
                .unwrap_or_else(|_| "./models/scaler.json".to_string()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Inter-tick delay for the telemetry producer
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
