use std::path::Path;

use ndarray::{Array1, ArrayView1};
use serde::Deserialize;

use super::{all_finite, read_json, ArtifactError, FeatureScaler, InferenceError};
use crate::models::FEATURE_COUNT;

// ---

/// `scaler.json` as written by the training pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScalerFile {
    // ---
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "unit_range")]
        feature_range: (f64, f64),
    },
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
}

fn unit_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// A fitted scaler, reduced to `x' = (x - offset) / divisor * gain + shift`.
#[derive(Debug, Clone)]
pub struct FittedScaler {
    // ---
    offset: Array1<f64>,
    divisor: Array1<f64>,
    gain: f64,
    shift: f64,
}

impl FittedScaler {
    // ---
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file: ScalerFile = read_json(path)?;
        Self::from_file(file)
    }

    /// Min-max scaling into `feature_range`:
    /// `x' = (x - data_min) / (data_max - data_min) * (hi - lo) + lo`.
    pub fn min_max(
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        feature_range: (f64, f64),
    ) -> Result<Self, ArtifactError> {
        // ---
        let (lo, hi) = feature_range;
        if !lo.is_finite() || !hi.is_finite() {
            return Err(ArtifactError::NonFinite("scaler feature_range"));
        }
        let data_min = column("data_min", data_min)?;
        let data_max = column("data_max", data_max)?;

        Ok(Self {
            divisor: nonzero(&data_max - &data_min),
            offset: data_min,
            gain: hi - lo,
            shift: lo,
        })
    }

    /// Standardization: `x' = (x - mean) / scale`.
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        // ---
        Ok(Self {
            offset: column("mean", mean)?,
            divisor: nonzero(column("scale", scale)?),
            gain: 1.0,
            shift: 0.0,
        })
    }

    fn from_file(file: ScalerFile) -> Result<Self, ArtifactError> {
        match file {
            ScalerFile::MinMax {
                data_min,
                data_max,
                feature_range,
            } => Self::min_max(data_min, data_max, feature_range),
            ScalerFile::Standard { mean, scale } => Self::standard(mean, scale),
        }
    }
}

fn column(name: &str, values: Vec<f64>) -> Result<Array1<f64>, ArtifactError> {
    // ---
    let values = Array1::from(values);
    if values.dim() != FEATURE_COUNT {
        return Err(ArtifactError::Shape(format!(
            "scaler {} has {} entries, expected {}",
            name,
            values.dim(),
            FEATURE_COUNT
        )));
    }
    if !all_finite(&values) {
        return Err(ArtifactError::NonFinite("scaler"));
    }
    Ok(values)
}

/// A zero divisor (constant column during fit) is replaced by 1.
fn nonzero(divisor: Array1<f64>) -> Array1<f64> {
    divisor.mapv(|d| if d == 0.0 { 1.0 } else { d })
}

impl FeatureScaler for FittedScaler {
    fn transform(
        &self,
        features: &[f64; FEATURE_COUNT],
    ) -> Result<[f64; FEATURE_COUNT], InferenceError> {
        // ---
        let x = ArrayView1::from(&features[..]);
        let scaled = (&x - &self.offset) / &self.divisor * self.gain + self.shift;

        if !all_finite(&scaled) {
            return Err(InferenceError::NonFinite { stage: "scaler" });
        }
        let mut out = [0.0; FEATURE_COUNT];
        out.iter_mut().zip(scaled.iter()).for_each(|(o, v)| *o = *v);
        Ok(out)
    }
}
