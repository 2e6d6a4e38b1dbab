use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{PredictError, PredictionResult, PredictionService, SensorPayload};

// ---

pub fn router() -> Router<Arc<PredictionService>> {
    // ---
    Router::new().route("/predict", post(handler).options(preflight))
}

/// `OPTIONS /predict` answers 204 whether or not the artifacts loaded.
/// The Flask service this replaces checked readiness first and answered a
/// degraded preflight with 503, which browsers report as a CORS failure.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn handler(
    State(service): State<Arc<PredictionService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, PredictError> {
    // ---
    debug!("POST /predict");

    // Step 1: Readiness comes before anything about the request
    service.ensure_ready().inspect_err(|_| {
        warn!("POST /predict - service unavailable");
    })?;

    // Step 2: Parse the body into a typed reading
    let payload = parse_payload(body)?;
    let reading = payload.to_reading().inspect_err(|e| {
        debug!("POST /predict - rejected body: {}", e);
    })?;

    // Step 3: Validate, scale and classify
    let prediction = service.predict(&reading)?;
    info!(
        "POST /predict - {} (p={:.4})",
        prediction.result.label(),
        prediction.probabilities.get(prediction.result)
    );

    Ok(Json(prediction))
}

/// Turn the raw body into a `SensorPayload`. The body must be a JSON object.
fn parse_payload(body: Result<Json<Value>, JsonRejection>) -> Result<SensorPayload, PredictError> {
    // ---
    let Json(value) = body.map_err(|rejection| PredictError::MalformedBody {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;

    if !value.is_object() {
        return Err(PredictError::MalformedBody {
            status: StatusCode::BAD_REQUEST,
            message: "Request body must be a JSON object.".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|_| PredictError::InvalidFormat)
}
