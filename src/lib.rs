//! Solar panel fault classification service.
//!
//! Validates four sensor readings (voltage, temperature, dust, irradiance),
//! scales them with a pre-fit scaler and classifies them with a pre-trained
//! network into one of ten fault classes. The HTTP surface lives in
//! `routes`; `main.rs` only wires configuration, tracing and the listener.

pub mod config;
pub mod error;
pub mod inference;
pub mod labels;
pub mod models;
pub mod routes;
pub mod service;
pub mod validation;

pub use config::Config;

// Re-exported for routes/*.rs, which only see the crate root and not the
// sibling modules that define these types.
pub use error::PredictError;
pub use labels::FaultClass;
pub use models::{PredictionResult, SensorPayload, SensorReading};
pub use routes::router;
pub use service::{ArtifactPaths, PredictionService};
