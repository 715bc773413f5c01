use crate::constants::Medium;
use crate::error::{require_positive, Result, SimError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Thiele-Small parameters as supplied by the caller, in SI units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverParams {
    /// Voice coil DC resistance (Ω).
    pub re: f64,
    /// Voice coil inductance (H).
    pub le: f64,
    /// Electrical Q factor.
    pub qes: f64,
    /// Mechanical Q factor.
    pub qms: f64,
    /// Free-air resonance (Hz).
    pub fs: f64,
    /// Equivalent compliance volume (m³).
    pub vas: f64,
    /// Suspension compliance (m/N).
    pub cms: f64,
    /// Moving mass including air load (kg).
    pub mms: f64,
    /// Force factor (N/A).
    pub bl: f64,
    /// Effective diaphragm area (m²).
    pub sd: f64,
    /// Mechanical resistance (N·s/m). Derived from Qms when absent.
    #[serde(default)]
    pub rms: Option<f64>,
    /// Nominal impedance (Ω), sets the drive level. Defaults to Re.
    #[serde(default)]
    pub z: Option<f64>,
}

/// A validated loudspeaker driver.
///
/// Immutable after construction; every enclosure model borrows it.
#[derive(Debug, Clone)]
pub struct Driver {
    pub re: f64,
    pub le: f64,
    pub qes: f64,
    pub qms: f64,
    pub fs: f64,
    pub vas: f64,
    pub cms: f64,
    pub mms: f64,
    pub bl: f64,
    pub sd: f64,
    pub rms: f64,
    pub z_nominal: f64,
    /// Equivalent piston radius √(Sd/π) (m).
    radius: f64,
    /// Moving mass without the air load on both faces (kg).
    mmd: f64,
    /// Flow resistance of the enclosure lining.
    flow_resistance: f64,
    medium: Medium,
}

impl Driver {
    pub fn new(params: &DriverParams, medium: &Medium) -> Result<Self> {
        let re = require_positive("re", params.re)?;
        let qes = require_positive("qes", params.qes)?;
        let qms = require_positive("qms", params.qms)?;
        let fs = require_positive("fs", params.fs)?;
        let vas = require_positive("vas", params.vas)?;
        let cms = require_positive("cms", params.cms)?;
        let mms = require_positive("mms", params.mms)?;
        let bl = require_positive("bl", params.bl)?;
        let sd = require_positive("sd", params.sd)?;
        if !(params.le.is_finite() && params.le >= 0.0) {
            return Err(SimError::invalid("le", params.le, "must be finite and non-negative"));
        }

        let rms = match params.rms {
            Some(rms) => require_positive("rms", rms)?,
            None => (1.0 / qms) * (mms / cms).sqrt(),
        };
        let z_nominal = match params.z {
            Some(z) => require_positive("z", z)?,
            None => re,
        };

        let radius = (sd / PI).sqrt();
        let mmd = mms - 16.0 * medium.density * radius.powi(3) / 3.0;
        if mmd <= 0.0 {
            return Err(SimError::NonPositiveMovingMass { mms, mmd });
        }

        let flow_resistance = flow_resistance(medium);
        log::debug!(
            "driver: a = {radius:.4} m, Mmd = {mmd:.5} kg, Rms = {rms:.4} N·s/m, Rf = {flow_resistance:.3}"
        );

        Ok(Self {
            re,
            le: params.le,
            qes,
            qms,
            fs,
            vas,
            cms,
            mms,
            bl,
            sd,
            rms,
            z_nominal,
            radius,
            mmd,
            flow_resistance,
            medium: *medium,
        })
    }

    /// Total Q factor.
    pub fn qts(&self) -> f64 {
        self.qes * self.qms / (self.qes + self.qms)
    }

    /// Equivalent piston radius (m).
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Moving mass Mmd = Mms − 16ρ₀a³/3 (kg).
    pub fn moving_mass(&self) -> f64 {
        self.mmd
    }

    /// Drive voltage: 1 W into the nominal impedance.
    pub fn drive_voltage(&self) -> f64 {
        self.z_nominal.sqrt()
    }

    /// Mechanical resonance from Mms and Cms (Hz).
    pub fn resonance_frequency(&self) -> f64 {
        1.0 / (2.0 * PI * (self.mms * self.cms).sqrt())
    }

    /// Flow resistance of the lining material, computed once at construction.
    pub fn flow_resistance(&self) -> f64 {
        self.flow_resistance
    }

    /// Complex wave number in the lined medium at `freq` (Hz).
    ///
    /// Undefined at zero frequency; the network clamps `freq` first.
    pub fn wave_number(&self, freq: f64) -> Complex64 {
        let lining = &self.medium.lining;
        let ratio = self.flow_resistance / freq;
        let k0 = 2.0 * PI * freq / self.medium.speed_of_sound;
        k0 * Complex64::new(
            1.0 + lining.a3 * ratio.powf(lining.b3),
            -lining.a4 * ratio.powf(lining.b4),
        )
    }
}

/// Flow resistance of a fibrous lining (Eq. 7.8, Beranek & Mellow).
pub fn flow_resistance(medium: &Medium) -> f64 {
    let mu = medium.viscosity;
    let lining = &medium.lining;
    let phi = lining.porosity;
    let r = lining.fiber_radius;
    let prefactor = 4.0 * mu * (1.0 - phi) / (phi * r * r);
    let log_term = 2.0 + (mu * phi / (2.0 * r * medium.density * lining.flow_velocity)).ln();
    prefactor * ((1.0 - 4.0 / PI * (1.0 - phi)) / log_term + (6.0 / PI) * (1.0 - phi))
}
