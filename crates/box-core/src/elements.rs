use crate::constants::Medium;
use crate::transfer_matrix::TransferMatrix;
use crate::NetworkElement;
use num_complex::Complex64;

/// Amplifier output resistance plus voice coil: Z = Rg + Re + jωLe.
#[derive(Debug, Clone)]
pub struct VoiceCoil {
    /// Rg + Re (Ω).
    pub resistance: f64,
    /// Le (H).
    pub inductance: f64,
}

impl NetworkElement for VoiceCoil {
    fn transfer_matrix(&self, omega: f64, _medium: &Medium) -> TransferMatrix {
        TransferMatrix::series(Complex64::new(self.resistance, omega * self.inductance))
    }
}

/// Electromechanical transduction (gyrator with ratio Bl).
#[derive(Debug, Clone)]
pub struct Motor {
    pub bl: f64,
}

impl NetworkElement for Motor {
    fn transfer_matrix(&self, _omega: f64, _medium: &Medium) -> TransferMatrix {
        TransferMatrix::gyrator(self.bl)
    }
}

/// Moving mass, suspension losses and compliance in series.
#[derive(Debug, Clone)]
pub struct Suspension {
    /// Moving mass without air load (kg).
    pub mass: f64,
    /// Mechanical resistance (N·s/m).
    pub resistance: f64,
    /// Compliance (m/N).
    pub compliance: f64,
}

impl Suspension {
    /// Mechanical impedance jωM + R + 1/(jωC).
    pub fn impedance(&self, omega: f64) -> Complex64 {
        Complex64::new(self.resistance, omega * self.mass - 1.0 / (omega * self.compliance))
    }
}

impl NetworkElement for Suspension {
    fn transfer_matrix(&self, omega: f64, _medium: &Medium) -> TransferMatrix {
        TransferMatrix::series(self.impedance(omega))
    }
}

/// Diaphragm area transform from force/velocity to pressure/volume velocity.
#[derive(Debug, Clone)]
pub struct Diaphragm {
    /// Effective area Sd (m²).
    pub area: f64,
}

impl NetworkElement for Diaphragm {
    fn transfer_matrix(&self, _omega: f64, _medium: &Medium) -> TransferMatrix {
        TransferMatrix::transformer(self.area)
    }
}

/// A straight port tube treated as a lossy acoustic transmission line.
#[derive(Debug, Clone)]
pub struct PortDuct {
    /// Length in metres.
    pub length: f64,
    /// Cross-sectional area in m².
    pub area: f64,
    /// Complex thermoviscous correction ξ applied to both the wave number
    /// and the characteristic impedance.
    pub loss_factor: Complex64,
}

impl PortDuct {
    pub fn new(length: f64, area: f64, loss_factor: Complex64) -> Self {
        Self {
            length,
            area,
            loss_factor,
        }
    }

    /// Characteristic impedance Z = ρcξ/S.
    pub fn impedance(&self, medium: &Medium) -> Complex64 {
        medium.characteristic_impedance() * self.loss_factor / self.area
    }
}

impl NetworkElement for PortDuct {
    fn transfer_matrix(&self, omega: f64, medium: &Medium) -> TransferMatrix {
        let k = omega * self.loss_factor / medium.speed_of_sound;
        TransferMatrix::line(k * self.length, self.impedance(medium))
    }
}
