// src/routes/health.rs
//! Readiness endpoint for the Solar Fault Analyzer.
//!
//! This module defines the `/health` route used by container orchestrators
//! (e.g., Docker, Kubernetes) and CI pipelines to check whether the service
//! loaded its artifacts. It is a sibling module in the `routes` directory and
//! follows the Explicit Module Boundary Pattern (EMBP):
//! - Internal to this file: endpoint handler(s) and related types
//! - Exports to the gateway (`mod.rs`): a subrouter containing the `/health` route
//!
//! The endpoint always answers 200; a degraded service is reported in the
//! body, so a missing model never takes the process out of rotation for
//! liveness purposes.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::PredictionService;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    scaler_loaded: bool,
}

/// Handle `GET /health`.
///
/// Reports `ok` when both the classifier and the scaler are loaded,
/// `degraded` otherwise.
async fn health(State(service): State<Arc<PredictionService>>) -> Json<HealthResponse> {
    // ---
    let readiness = service.readiness();
    Json(HealthResponse {
        status: if readiness.is_ready() { "ok" } else { "degraded" },
        model_loaded: readiness.model_loaded,
        scaler_loaded: readiness.scaler_loaded,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<Arc<PredictionService>> {
    Router::new().route("/health", get(health))
}
