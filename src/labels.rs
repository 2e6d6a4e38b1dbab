//! Fixed fault classes produced by the solar panel classifier.
//!
//! The class indices are baked into the trained model: index `i` of the
//! classifier's output vector is the probability of `FaultClass::ALL[i]`.

use serde::Serialize;

/// Number of classes the classifier was trained on.
pub const CLASS_COUNT: usize = 10;

// ---

/// One of the ten fault states a panel can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClass {
    // ---
    Normal,
    Soiling,
    HighTemp,
    Shading,
    /// Sensor error / value out of range. Also returned when input
    /// validation rejects a reading.
    SensorError,
    TempShade,
    DustTemp,
    DustShade,
    WorstCase,
    LowTemp,
}

impl FaultClass {
    // ---
    /// All classes in model output order.
    pub const ALL: [FaultClass; CLASS_COUNT] = [
        FaultClass::Normal,
        FaultClass::Soiling,
        FaultClass::HighTemp,
        FaultClass::Shading,
        FaultClass::SensorError,
        FaultClass::TempShade,
        FaultClass::DustTemp,
        FaultClass::DustShade,
        FaultClass::WorstCase,
        FaultClass::LowTemp,
    ];

    /// Class used for both predicted sensor errors and rejected input.
    pub const DESIGNATED_FAULT: FaultClass = FaultClass::SensorError;

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label sent to clients.
    pub fn label(self) -> &'static str {
        // ---
        match self {
            FaultClass::Normal => "Normal",
            FaultClass::Soiling => "Soiling",
            FaultClass::HighTemp => "High Temp",
            FaultClass::Shading => "Shading",
            FaultClass::SensorError => "Sensor Error / Out of Range",
            FaultClass::TempShade => "Temp + Shade",
            FaultClass::DustTemp => "Dust + Temp",
            FaultClass::DustShade => "Dust + Shade",
            FaultClass::WorstCase => "Dust + Temp + Shade (Worst Case)",
            FaultClass::LowTemp => "Low Temp",
        }
    }
}

impl Serialize for FaultClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
