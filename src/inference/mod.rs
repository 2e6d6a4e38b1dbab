//! Inference artifacts: the fitted feature scaler and the trained classifier.
//!
//! Both are loaded once at startup and only read afterwards, so the traits
//! take `&self` and require `Send + Sync` for sharing across request tasks.
//! The JSON-backed implementations live in the sibling modules; tests swap in
//! their own implementations through the same traits.

use std::path::{Path, PathBuf};

use crate::labels::CLASS_COUNT;
use crate::models::FEATURE_COUNT;

mod classifier;
mod scaler;

pub use classifier::NeuralClassifier;
pub use scaler::FittedScaler;

// ---

/// Maps a raw feature vector (training order) to the classifier's input space.
pub trait FeatureScaler: Send + Sync {
    fn transform(
        &self,
        features: &[f64; FEATURE_COUNT],
    ) -> Result<[f64; FEATURE_COUNT], InferenceError>;
}

/// Maps a normalized feature vector to a probability per fault class.
pub trait Classifier: Send + Sync {
    fn predict_proba(
        &self,
        features: &[f64; FEATURE_COUNT],
    ) -> Result<[f64; CLASS_COUNT], InferenceError>;
}

/// Failure while loading an artifact from disk.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    // ---
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid shape: {0}")]
    Shape(String),

    #[error("non-finite parameter in {0}")]
    NonFinite(&'static str),
}

/// Failure while running a loaded artifact on one feature vector.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    // ---
    #[error("{stage} produced a non-finite value")]
    NonFinite { stage: &'static str },

    #[error("dimension mismatch in {stage}: expected {expected}, got {actual}")]
    Dimension {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Read and deserialize one JSON artifact.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    // ---
    let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn all_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}
