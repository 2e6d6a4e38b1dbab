//! Error taxonomy for the prediction endpoint and its HTTP mapping.
//!
//! Every variant renders as a JSON object with an `error` field. Out-of-range
//! input additionally carries `result`, set to the designated fault label.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::labels::FaultClass;
use crate::models::REQUIRED_KEYS;

pub const INVALID_FORMAT_MESSAGE: &str = "Invalid data format. All inputs must be numerical.";
pub const UNAVAILABLE_MESSAGE: &str = "Model or Scaler not loaded. Service unavailable.";
pub const INTERNAL_MESSAGE: &str = "Internal server error during prediction.";

// ---

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    // ---
    #[error("Missing one or more required keys: [{}]", REQUIRED_KEYS.join(", "))]
    MissingField,

    #[error("{}", INVALID_FORMAT_MESSAGE)]
    InvalidFormat,

    /// Carries the bound-violation message from `validation::validate`.
    #[error("{0}")]
    OutOfRange(String),

    #[error("{}", UNAVAILABLE_MESSAGE)]
    ServiceUnavailable,

    /// Detail is for the server log only.
    #[error("prediction failed: {0}")]
    Internal(String),

    /// The body could not be read as a JSON object.
    #[error("{message}")]
    MalformedBody { status: StatusCode, message: String },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    // ---
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<FaultClass>,
    error: String,
}

impl PredictError {
    // ---
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            PredictError::MissingField
            | PredictError::InvalidFormat
            | PredictError::OutOfRange(_) => StatusCode::BAD_REQUEST,
            PredictError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PredictError::MalformedBody { status, .. } => *status,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        let body = match &self {
            PredictError::OutOfRange(msg) => ErrorBody {
                result: Some(FaultClass::DESIGNATED_FAULT),
                error: msg.clone(),
            },
            PredictError::Internal(detail) => {
                tracing::error!("Prediction error (internal): {}", detail);
                ErrorBody {
                    result: None,
                    error: INTERNAL_MESSAGE.to_string(),
                }
            }
            other => ErrorBody {
                result: None,
                error: other.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
