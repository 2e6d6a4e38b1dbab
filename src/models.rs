//! Request and response models for the prediction endpoint.

use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::PredictError;
use crate::labels::{FaultClass, CLASS_COUNT};

/// Keys a `/predict` body must carry, in the order they are reported.
pub const REQUIRED_KEYS: [&str; 4] = ["voltage", "temperature", "dust", "irradiance"];

/// Number of features the scaler and classifier were fit on.
pub const FEATURE_COUNT: usize = 4;

// ---

/// Raw `/predict` body as sent by the client.
///
/// Each field keeps whatever JSON value was sent so that a missing key can be
/// told apart from a key that is present but not numeric (including `null`).
#[derive(Debug, Default, Deserialize)]
pub struct SensorPayload {
    // ---
    #[serde(default, deserialize_with = "present")]
    pub voltage: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub temperature: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub dust: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub irradiance: Option<Value>,
}

/// A key that appears in the body is `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parsed sensor reading, in the natural input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    // ---
    pub voltage: f64,
    pub temperature: f64,
    pub dust: f64,
    pub irradiance: f64,
}

/// Parse-and-coerce step from the raw body to a typed reading.
impl SensorPayload {
    // ---
    /// Fails with `MissingField` if any key is absent, otherwise with
    /// `InvalidFormat` if any value cannot be coerced to a number.
    pub fn to_reading(&self) -> Result<SensorReading, PredictError> {
        // ---
        let (Some(voltage), Some(temperature), Some(dust), Some(irradiance)) = (
            &self.voltage,
            &self.temperature,
            &self.dust,
            &self.irradiance,
        ) else {
            return Err(PredictError::MissingField);
        };

        Ok(SensorReading {
            voltage: coerce_number(voltage)?,
            temperature: coerce_number(temperature)?,
            dust: coerce_number(dust)?,
            irradiance: coerce_number(irradiance)?,
        })
    }
}

/// Coerce a JSON value to `f64` the way a lenient form handler would:
/// numbers as-is, numeric strings parsed, booleans as 1/0.
fn coerce_number(value: &Value) -> Result<f64, PredictError> {
    // ---
    match value {
        Value::Number(n) => n.as_f64().ok_or(PredictError::InvalidFormat),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PredictError::InvalidFormat),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(PredictError::InvalidFormat),
    }
}

impl SensorReading {
    // ---
    /// Feature vector in training order: voltage, dust, temperature, irradiance.
    pub fn feature_vector(&self) -> [f64; FEATURE_COUNT] {
        [self.voltage, self.dust, self.temperature, self.irradiance]
    }
}

/// Probability for every class, serialized as a `{label: probability}` map
/// in class index order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities(pub [f64; CLASS_COUNT]);

impl ClassProbabilities {
    // ---
    /// Index of the most likely class. Ties resolve to the lowest index.
    pub fn argmax(&self) -> usize {
        // ---
        let mut best = 0;
        for (i, p) in self.0.iter().enumerate().skip(1) {
            if *p > self.0[best] {
                best = i;
            }
        }
        best
    }

    pub fn get(&self, class: FaultClass) -> f64 {
        self.0[class.index()]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // ---
        let mut map = serializer.serialize_map(Some(CLASS_COUNT))?;
        for (class, p) in FaultClass::ALL.iter().zip(self.0.iter()) {
            map.serialize_entry(class.label(), p)?;
        }
        map.end()
    }
}

/// Successful `/predict` response body.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    // ---
    pub result: FaultClass,
    pub probabilities: ClassProbabilities,
}
