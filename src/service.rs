//! The prediction service context.
//!
//! Built once at startup and shared read-only with every request handler.
//! If either artifact fails to load the service still starts, but in a
//! degraded state where every prediction fails with `ServiceUnavailable`.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::PredictError;
use crate::inference::{Classifier, FeatureScaler, FittedScaler, NeuralClassifier};
use crate::labels::FaultClass;
use crate::models::{ClassProbabilities, PredictionResult, SensorReading};
use crate::validation::validate;

// ---

/// Filesystem locations of the two artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    // ---
    pub model: PathBuf,
    pub scaler: PathBuf,
}

/// Loaded scaler and classifier, either of which may be missing.
#[derive(Clone)]
pub struct PredictionService {
    // ---
    scaler: Option<Arc<dyn FeatureScaler>>,
    classifier: Option<Arc<dyn Classifier>>,
}

/// Load state reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    // ---
    pub model_loaded: bool,
    pub scaler_loaded: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.model_loaded && self.scaler_loaded
    }
}

impl PredictionService {
    // ---
    /// Load both artifacts. Load failures are logged and leave the
    /// corresponding slot empty; this never fails.
    pub fn load(paths: &ArtifactPaths) -> Self {
        // ---
        let classifier = match NeuralClassifier::load(&paths.model) {
            Ok(model) => {
                info!(
                    "Model loaded from {} ({} layers)",
                    paths.model.display(),
                    model.layer_count()
                );
                Some(Arc::new(model) as Arc<dyn Classifier>)
            }
            Err(e) => {
                error!("Error loading model: {}", e);
                None
            }
        };

        let scaler = match FittedScaler::load(&paths.scaler) {
            Ok(scaler) => {
                info!("Scaler loaded from {}", paths.scaler.display());
                Some(Arc::new(scaler) as Arc<dyn FeatureScaler>)
            }
            Err(e) => {
                error!("Error loading scaler: {}", e);
                None
            }
        };

        let service = Self { scaler, classifier };
        if !service.readiness().is_ready() {
            error!("Prediction service is degraded; /predict will answer 503");
        }
        service
    }

    /// Build a service from already-loaded parts.
    pub fn from_parts(
        scaler: Option<Arc<dyn FeatureScaler>>,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Self {
        Self { scaler, classifier }
    }

    pub fn readiness(&self) -> Readiness {
        Readiness {
            model_loaded: self.classifier.is_some(),
            scaler_loaded: self.scaler.is_some(),
        }
    }

    /// Fails fast when either artifact is missing.
    pub fn ensure_ready(&self) -> Result<(), PredictError> {
        if self.readiness().is_ready() {
            Ok(())
        } else {
            Err(PredictError::ServiceUnavailable)
        }
    }

    /// Classify one parsed reading.
    ///
    /// Out-of-range readings are answered with `OutOfRange`, which renders as
    /// the designated fault class plus the bound-violation message.
    pub fn predict(&self, reading: &SensorReading) -> Result<PredictionResult, PredictError> {
        // ---
        let (Some(scaler), Some(classifier)) = (&self.scaler, &self.classifier) else {
            return Err(PredictError::ServiceUnavailable);
        };

        if let Some(message) = validate(reading) {
            debug!("Rejected reading {:?}: {}", reading, message);
            return Err(PredictError::OutOfRange(message));
        }

        let features = reading.feature_vector();
        let scaled = scaler
            .transform(&features)
            .map_err(|e| PredictError::Internal(e.to_string()))?;
        let probabilities = classifier
            .predict_proba(&scaled)
            .map_err(|e| PredictError::Internal(e.to_string()))?;

        let probabilities = ClassProbabilities(probabilities);
        let index = probabilities.argmax();
        let result = FaultClass::from_index(index)
            .ok_or_else(|| PredictError::Internal(format!("class index {index} has no label")))?;

        debug!(
            "Features {:?} scaled to {:?}, predicted {} (p={:.4})",
            features,
            scaled,
            result.label(),
            probabilities.get(result)
        );

        Ok(PredictionResult {
            result,
            probabilities,
        })
    }
}
