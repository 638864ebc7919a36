//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::predictor::PredictorError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The dataset's anomaly subset is empty
    NoAnomalies,
    /// Scoring failed on the synchronous injection path
    Predictor(String),
    /// Anything else
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NoAnomalies => (StatusCode::NOT_FOUND, "No anomalies found".to_string()),
            AppError::Predictor(msg) => {
                tracing::error!("Predictor error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        // Error body shape is part of the wire contract
        let body = Json(json!({ "error": error_message }));

        (status, body).into_response()
    }
}

impl From<PredictorError> for AppError {
    fn from(err: PredictorError) -> Self {
        AppError::Predictor(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn no_anomalies_body_matches_contract() {
        let response = AppError::NoAnomalies.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "No anomalies found" }));
    }

    #[tokio::test]
    async fn predictor_failure_is_a_structured_error() {
        let response = AppError::Predictor("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Prediction failed");
    }
}
