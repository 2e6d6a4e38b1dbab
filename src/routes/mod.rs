use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{Config, PredictionService};

mod health;
mod home;
mod predict;

// ---

pub fn router(service: PredictionService, config: &Config) -> Router {
    // ---
    Router::new()
        .merge(predict::router())
        .merge(home::router())
        .merge(health::router())
        .with_state(Arc::new(service))
        .layer(cors_layer(&config.cors_origin))
        .layer(middleware::from_fn(preflight_no_content))
}

/// CORS with credentials. A `*` origin, alone or anywhere in the list,
/// mirrors the caller's origin since browsers reject a literal `*` alongside
/// credentials.
fn cors_layer(allowed: &str) -> CorsLayer {
    // ---
    let entries: Vec<&str> = allowed.split(',').map(str::trim).collect();
    let origin = if entries.contains(&"*") {
        AllowOrigin::mirror_request()
    } else {
        let origins = entries
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}

/// The CORS layer answers every OPTIONS request itself with 200; preflights
/// are reported as 204 No Content.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    // ---
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
