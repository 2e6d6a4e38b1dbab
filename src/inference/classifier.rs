use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1};
use serde::Deserialize;

use super::{all_finite, read_json, ArtifactError, Classifier, InferenceError};
use crate::labels::CLASS_COUNT;
use crate::models::FEATURE_COUNT;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Activation {
    // ---
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

/// One layer as stored in the network file: `weights` is `out x in`
/// row-major, `bias` has `out` entries.
#[derive(Debug, Deserialize)]
struct LayerFile {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    activation: Activation,
}

#[derive(Debug, Deserialize)]
struct NetworkFile {
    layers: Vec<LayerFile>,
}

/// Fully connected layer computing `activation(weights . x + bias)`.
#[derive(Debug, Clone)]
pub(crate) struct DenseLayer {
    // ---
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

/// Feed-forward network exported by the training pipeline.
///
/// Takes the four scaled features and ends in a softmax over the ten fault
/// classes. Shapes are checked once at load, so a forward pass never fails on
/// dimensions.
#[derive(Debug, Clone)]
pub struct NeuralClassifier {
    layers: Vec<DenseLayer>,
}

impl DenseLayer {
    // ---
    pub(crate) fn from_rows(
        rows: Vec<Vec<f64>>,
        bias: Vec<f64>,
        activation: Activation,
    ) -> Result<Self, ArtifactError> {
        // ---
        let n_out = rows.len();
        let n_in = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != n_in) {
            return Err(ArtifactError::Shape("weight rows differ in length".into()));
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((n_out, n_in), flat)
            .map_err(|e| ArtifactError::Shape(e.to_string()))?;

        Ok(Self {
            weights,
            bias: Array1::from(bias),
            activation,
        })
    }

    fn forward(&self, input: &ArrayView1<f64>) -> Array1<f64> {
        // ---
        let z = self.weights.dot(input) + &self.bias;

        match self.activation {
            Activation::Linear => z,
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Tanh => z.mapv(f64::tanh),
            Activation::Softmax => softmax(z),
        }
    }
}

/// Numerically stable softmax.
fn softmax(z: Array1<f64>) -> Array1<f64> {
    // ---
    let max = z.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exp = z.mapv(|v| (v - max).exp());
    let total = exp.sum();
    exp / total
}

impl NeuralClassifier {
    // ---
    pub(crate) fn new(layers: Vec<DenseLayer>) -> Result<Self, ArtifactError> {
        // ---
        let Some(last) = layers.last() else {
            return Err(ArtifactError::Shape("classifier has no layers".into()));
        };
        if last.activation != Activation::Softmax {
            return Err(ArtifactError::Shape(
                "classifier output layer must use softmax".into(),
            ));
        }

        let mut width = FEATURE_COUNT;
        for (n, layer) in layers.iter().enumerate() {
            let (n_out, n_in) = layer.weights.dim();
            if n_out != layer.bias.dim() {
                return Err(ArtifactError::Shape(format!(
                    "layer {}: {} weight rows but {} biases",
                    n,
                    n_out,
                    layer.bias.dim()
                )));
            }
            if n_in != width {
                return Err(ArtifactError::Shape(format!(
                    "layer {}: expected {} inputs, got {}",
                    n, width, n_in
                )));
            }
            if !all_finite(&layer.bias) || !all_finite(&layer.weights) {
                return Err(ArtifactError::NonFinite("classifier"));
            }
            width = n_out;
        }

        if width != CLASS_COUNT {
            return Err(ArtifactError::Shape(format!(
                "classifier produces {} outputs, expected {}",
                width, CLASS_COUNT
            )));
        }

        Ok(Self { layers })
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file: NetworkFile = read_json(path)?;
        Self::from_file(file)
    }

    fn from_file(file: NetworkFile) -> Result<Self, ArtifactError> {
        // ---
        let layers = file
            .layers
            .into_iter()
            .map(|l| DenseLayer::from_rows(l.weights, l.bias, l.activation))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(layers)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl Classifier for NeuralClassifier {
    fn predict_proba(
        &self,
        features: &[f64; FEATURE_COUNT],
    ) -> Result<[f64; CLASS_COUNT], InferenceError> {
        // ---
        let mut activations = Array1::from(features.to_vec());
        for layer in &self.layers {
            activations = layer.forward(&activations.view());
        }

        if activations.dim() != CLASS_COUNT {
            return Err(InferenceError::Dimension {
                stage: "classifier",
                expected: CLASS_COUNT,
                actual: activations.dim(),
            });
        }
        if !all_finite(&activations) {
            return Err(InferenceError::NonFinite {
                stage: "classifier",
            });
        }

        let mut probabilities = [0.0; CLASS_COUNT];
        probabilities
            .iter_mut()
            .zip(activations.iter())
            .for_each(|(p, v)| *p = *v);
        Ok(probabilities)
    }
}
