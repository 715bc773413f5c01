use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Model used for the diaphragm's radiation load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiaphragmRadiation {
    /// Bessel/Struve circular piston.
    #[default]
    Piston,
    /// Low-frequency approximation R = 0.01076·f², X = 1.5·f/a.
    Simplified,
}

/// Tunables of the engine. Defaults reproduce the reference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lowest grid frequency (Hz).
    pub f_min: f64,
    /// Highest grid frequency (Hz).
    pub f_max: f64,
    /// Number of log-spaced grid points.
    pub points: usize,
    /// Highest m, n index kept in the rectangular port series.
    pub truncation_limit: usize,
    /// Output resistance of the amplifier (Ω).
    pub source_resistance: f64,
    /// Box mass-loading coefficient B for sealed boxes.
    pub sealed_mass_loading: f64,
    /// Box mass-loading coefficient B for ported boxes.
    pub ported_mass_loading: f64,
    /// Leakage quality factor Q_L of ported boxes.
    pub leakage_q: f64,
    /// Complex thermoviscous correction ξ of the port line, as (re, im).
    pub port_loss_factor: (f64, f64),
    pub diaphragm_radiation: DiaphragmRadiation,
    /// Report diaphragm and port SPL separately (ported boxes only).
    pub split_contributions: bool,
    /// Evaluate the grid on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            f_min: 20.0,
            f_max: 20_000.0,
            points: 957,
            truncation_limit: 10,
            source_resistance: 0.75,
            sealed_mass_loading: 0.46,
            ported_mass_loading: 0.3,
            leakage_q: 7.0,
            port_loss_factor: (0.998, 0.001),
            diaphragm_radiation: DiaphragmRadiation::Piston,
            split_contributions: false,
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.f_min.is_finite() && self.f_min > 0.0) {
            return Err(invalid(format!("f_min must be positive, got {}", self.f_min)));
        }
        if !(self.f_max.is_finite() && self.f_max > self.f_min) {
            return Err(invalid(format!(
                "f_max ({}) must exceed f_min ({})",
                self.f_max, self.f_min
            )));
        }
        if self.points < 2 {
            return Err(invalid(format!("need at least 2 grid points, got {}", self.points)));
        }
        if !(1..=30).contains(&self.truncation_limit) {
            return Err(invalid(format!(
                "truncation_limit must lie in 1..=30, got {}",
                self.truncation_limit
            )));
        }
        if !(self.source_resistance.is_finite() && self.source_resistance >= 0.0) {
            return Err(invalid(format!(
                "source_resistance must be non-negative, got {}",
                self.source_resistance
            )));
        }
        for (name, value) in [
            ("sealed_mass_loading", self.sealed_mass_loading),
            ("ported_mass_loading", self.ported_mass_loading),
            ("leakage_q", self.leakage_q),
            ("port_loss_factor.re", self.port_loss_factor.0),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> SimError {
    SimError::InvalidConfig { message }
}
