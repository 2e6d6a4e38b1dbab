//! Physical bounds for the four sensor inputs.
//!
//! Readings outside these ranges are not fed to the model; the caller gets
//! the designated fault class instead.

use crate::models::SensorReading;

/// Inclusive acceptable range for one sensor field.
#[derive(Debug, Clone, Copy)]
pub struct Bound {
    // ---
    pub field: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const VOLTAGE: Bound = Bound {
    field: "voltage",
    unit: "V",
    min: -5.0,
    max: 20.0,
};

pub const TEMPERATURE: Bound = Bound {
    field: "temperature",
    unit: "°C",
    min: -50.0,
    max: 60.0,
};

pub const DUST: Bound = Bound {
    field: "dust",
    unit: "µg/m³",
    min: 0.0,
    max: 1000.0,
};

pub const IRRADIANCE: Bound = Bound {
    field: "irradiance",
    unit: "lx",
    min: -10.0,
    max: 20000.0,
};

// ---

impl Bound {
    // ---
    /// NaN and infinities never pass.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn violation(&self, value: f64) -> String {
        format!(
            "Input Error: {} ({:.2} {}) is outside the acceptable range ({} {} to {} {})",
            self.field, value, self.unit, self.min, self.unit, self.max, self.unit
        )
    }
}

/// Check each field against its bound in the order voltage, temperature,
/// dust, irradiance. Returns the message for the first violation, or `None`
/// when every field is within range.
pub fn validate(reading: &SensorReading) -> Option<String> {
    // ---
    [
        (VOLTAGE, reading.voltage),
        (TEMPERATURE, reading.temperature),
        (DUST, reading.dust),
        (IRRADIANCE, reading.irradiance),
    ]
    .into_iter()
    .find(|(bound, value)| !bound.contains(*value))
    .map(|(bound, value)| bound.violation(value))
}
