//! Error type for the response engine.
//!
//! Every failure is detected before the first frequency is evaluated; a
//! sweep that starts always runs to completion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A required parameter was not supplied.
    #[error("missing required parameter '{name}'")]
    MissingParameter { name: String },

    /// A parameter was supplied but is out of its physical range.
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    /// The topology selector names no known enclosure.
    #[error("unknown scenario '{name}' (expected open_air, sealed or ported)")]
    UnknownScenario { name: String },

    /// The enclosure geometry cannot describe a physical box or port.
    #[error("degenerate enclosure geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Subtracting the air load from Mms left no moving mass.
    #[error("effective moving mass Mmd = {mmd} kg is not positive (Mms = {mms} kg)")]
    NonPositiveMovingMass { mms: f64, mmd: f64 },

    /// Engine configuration or medium constants are unusable.
    #[error("invalid engine configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn invalid(name: &str, value: f64, reason: &str) -> Self {
        SimError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        SimError::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Returns true if the error comes from the supplied parameters rather
    /// than from the engine configuration.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, SimError::InvalidConfig { .. })
    }
}

/// Require `value` to be finite and strictly positive.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::invalid(name, value, "must be finite and positive"))
    }
}
