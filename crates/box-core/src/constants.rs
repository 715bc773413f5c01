use serde::{Deserialize, Serialize};

/// Reference sound power for power levels (W).
pub const REFERENCE_POWER: f64 = 1e-12;

/// Lowest frequency the network is evaluated at (Hz). Requests below this are
/// clamped so the wave number and radiation terms stay finite.
pub const FREQUENCY_FLOOR: f64 = 1.0;

/// Specific gas constant of dry air (J/(kg·K)).
const GAS_CONSTANT_AIR: f64 = 287.05;

/// Ideal-gas speed of sound (m/s) and density (kg/m³) of dry air at
/// `temperature_c` (°C) and static pressure `pressure` (Pa).
///
/// Below absolute zero both come out NaN, which [`Medium`] validation rejects.
pub fn air_properties(temperature_c: f64, pressure: f64) -> (f64, f64) {
    let kelvin = temperature_c + 273.15;
    let c = 331.3 * (kelvin / 273.15).sqrt();
    let rho = if kelvin > 0.0 {
        pressure / (GAS_CONSTANT_AIR * kelvin)
    } else {
        f64::NAN
    };
    (c, rho)
}

/// Cross-sectional area from diameter (both in metres).
pub fn area_from_diameter(diameter: f64) -> f64 {
    std::f64::consts::PI * (diameter / 2.0).powi(2)
}

/// Fibrous lining material inside the enclosure.
///
/// The four empirical coefficients shape the complex wave number of the
/// lossy medium, see [`crate::driver::Driver::wave_number`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lining {
    /// Fiber radius (m).
    pub fiber_radius: f64,
    /// Porosity, 0–1.
    pub porosity: f64,
    /// Flow velocity through the material (m/s).
    pub flow_velocity: f64,
    pub a3: f64,
    pub a4: f64,
    pub b3: f64,
    pub b4: f64,
}

impl Default for Lining {
    fn default() -> Self {
        Self {
            fiber_radius: 60e-6,
            porosity: 0.99,
            flow_velocity: 0.03,
            a3: 0.0858,
            a4: 0.175,
            b3: 0.7,
            b4: 0.59,
        }
    }
}

/// The propagation medium and every physical constant the network uses.
///
/// Built once per request and only ever borrowed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medium {
    /// Speed of sound (m/s).
    pub speed_of_sound: f64,
    /// Air density (kg/m³).
    pub density: f64,
    /// Atmospheric pressure (Pa).
    pub atmospheric_pressure: f64,
    /// Adiabatic index of air.
    pub adiabatic_index: f64,
    /// Dynamic viscosity (N·s/m²).
    pub viscosity: f64,
    /// Molecular mean free path (m).
    pub mean_free_path: f64,
    /// Reference pressure for SPL (Pa).
    pub reference_pressure: f64,
    pub lining: Lining,
}

impl Default for Medium {
    fn default() -> Self {
        Self {
            speed_of_sound: 344.8,
            density: 1.18,
            atmospheric_pressure: 1e5,
            adiabatic_index: 1.4,
            viscosity: 1.86e-5,
            mean_free_path: 6e-8,
            reference_pressure: 20e-6,
            lining: Lining::default(),
        }
    }
}

impl Medium {
    /// Default medium with speed of sound and density taken from the
    /// ideal-gas relations at `temperature_c` and the default static pressure.
    pub fn at_temperature(temperature_c: f64) -> Self {
        let base = Self::default();
        let (c, rho) = air_properties(temperature_c, base.atmospheric_pressure);
        Self {
            speed_of_sound: c,
            density: rho,
            ..base
        }
    }

    /// Characteristic impedance ρ₀c (Pa·s/m).
    pub fn characteristic_impedance(&self) -> f64 {
        self.density * self.speed_of_sound
    }

    /// Free-field (lossless) wave number ω/c.
    pub fn free_wave_number(&self, omega: f64) -> f64 {
        omega / self.speed_of_sound
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        let positive = [
            ("speed_of_sound", self.speed_of_sound),
            ("density", self.density),
            ("atmospheric_pressure", self.atmospheric_pressure),
            ("adiabatic_index", self.adiabatic_index),
            ("viscosity", self.viscosity),
            ("mean_free_path", self.mean_free_path),
            ("reference_pressure", self.reference_pressure),
            ("lining.fiber_radius", self.lining.fiber_radius),
            ("lining.flow_velocity", self.lining.flow_velocity),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(crate::SimError::InvalidConfig {
                    message: format!("medium constant {name} must be positive, got {value}"),
                });
            }
        }
        let porosity = self.lining.porosity;
        if !(porosity > 0.0 && porosity < 1.0) {
            return Err(crate::SimError::InvalidConfig {
                message: format!("lining porosity must lie in (0, 1), got {porosity}"),
            });
        }
        Ok(())
    }
}
