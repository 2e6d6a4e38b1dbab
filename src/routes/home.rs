//! Liveness endpoint at `/`.
//!
//! Answers regardless of whether the model artifacts loaded; readiness is
//! reported separately by `/health`.

use axum::{routing::get, Json, Router};
use serde::Serialize;

pub const RUNNING_MESSAGE: &str = "Solar Fault Analyzer API is running";

#[derive(Serialize)]
struct HomeResponse {
    message: &'static str,
}

/// Handle `GET /`.
async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: RUNNING_MESSAGE,
    })
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(home))
}
