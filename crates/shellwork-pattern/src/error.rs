//! Error types for the placement engine.

use thiserror::Error;

/// Configuration problems detected before any geometry is generated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// A shell, track or pattern parameter is out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Pattern pitch must be positive.
    #[error("pattern pitch must be positive, got {0}")]
    NonPositivePitch(f64),

    /// Corner radius leaves no straight wall.
    #[error("corner radius {radius} must be below half the smaller shell side ({limit})")]
    CornerRadiusTooLarge {
        /// Configured radius.
        radius: f64,
        /// `min(width, height) / 2`.
        limit: f64,
    },

    /// Two track zones on one wall overlap.
    #[error("track zones {first} and {second} overlap on the {wall} wall by {overlap:.3} mm")]
    OverlappingZones {
        /// Wall name.
        wall: String,
        /// Index of the first zone.
        first: usize,
        /// Index of the second zone.
        second: usize,
        /// Overlap length in mm.
        overlap: f64,
    },

    /// The bowtie connector would not seat in the dovetail groove.
    #[error("connector does not fit groove: wide half-width {connector:.3} + clearance exceeds {groove:.3}")]
    ConnectorMisfit {
        /// Connector wide half-width.
        connector: f64,
        /// Groove wide half-width.
        groove: f64,
    },

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for PlacementError {
    fn from(err: toml::de::Error) -> Self {
        PlacementError::Parse(err.to_string())
    }
}

/// Result type for placement operations.
pub type Result<T> = std::result::Result<T, PlacementError>;
