use crate::config::{DiaphragmRadiation, EngineConfig};
use crate::constants::{Medium, FREQUENCY_FLOOR};
use crate::driver::Driver;
use crate::elements::{Diaphragm, Motor, PortDuct, Suspension, VoiceCoil};
use crate::enclosure::{Cabinet, Enclosure, PortedBox};
use crate::radiation::{piston_impedance, simplified_piston_impedance, RectangularRadiator};
use crate::transfer_matrix::TransferMatrix;
use crate::NetworkElement;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Network quantities at one frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkPoint {
    /// Frequency the point was requested at (Hz).
    pub frequency: f64,
    /// Driver input impedance, excluding the amplifier's output resistance.
    pub impedance: Complex64,
    /// Net radiated volume velocity (m³/s).
    pub volume_velocity: Complex64,
    /// Volume velocity of the diaphragm alone.
    pub diaphragm_velocity: Complex64,
    /// Volume velocity out of the port (ported boxes only).
    pub port_velocity: Option<Complex64>,
    /// The port radiation series did not converge and its high-frequency
    /// limit was used.
    pub port_fallback: bool,
}

/// Everything frequency-independent about the port branch.
#[derive(Debug, Clone)]
struct PortBranch {
    geometry: PortedBox,
    duct: PortDuct,
    radiator: RectangularRadiator,
    leakage_resistance: f64,
}

/// What the diaphragm drives into.
#[derive(Debug, Clone)]
enum Load {
    FreeAir,
    Sealed(Cabinet),
    Ported(Box<PortBranch>),
}

/// A driver bound to one enclosure, ready to be evaluated at any frequency.
#[derive(Debug, Clone)]
pub struct SpeakerSystem {
    driver: Driver,
    enclosure: Enclosure,
    medium: Medium,
    config: EngineConfig,
    coil: VoiceCoil,
    motor: Motor,
    suspension: Suspension,
    diaphragm: Diaphragm,
    load: Load,
}

impl SpeakerSystem {
    pub fn new(driver: Driver, enclosure: Enclosure, medium: Medium, config: EngineConfig) -> Self {
        let coil = VoiceCoil {
            resistance: config.source_resistance + driver.re,
            inductance: driver.le,
        };
        let motor = Motor { bl: driver.bl };
        let suspension = Suspension {
            mass: driver.moving_mass(),
            resistance: driver.rms,
            compliance: driver.cms,
        };
        let diaphragm = Diaphragm { area: driver.sd };

        let load = match &enclosure {
            Enclosure::OpenAir => Load::FreeAir,
            Enclosure::Sealed(cabinet) => Load::Sealed(*cabinet),
            Enclosure::Ported(ported) => {
                let (re, im) = config.port_loss_factor;
                let p = ported.port;
                let branch = PortBranch {
                    geometry: *ported,
                    duct: PortDuct::new(p.length, p.area, Complex64::new(re, im)),
                    radiator: RectangularRadiator::new(
                        p.width,
                        p.height,
                        p.area,
                        config.truncation_limit,
                    ),
                    leakage_resistance: ported.leakage_resistance(config.leakage_q, &medium),
                };
                log::debug!(
                    "ported box: Vb = {:.4} m³, fb = {:.2} Hz, Ral = {:.4e}",
                    ported.cabinet.volume(),
                    ported.tuning_frequency(&medium),
                    branch.leakage_resistance
                );
                Load::Ported(Box::new(branch))
            }
        };

        Self {
            driver,
            enclosure,
            medium,
            config,
            coil,
            motor,
            suspension,
            diaphragm,
            load,
        }
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn enclosure(&self) -> &Enclosure {
        &self.enclosure
    }

    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Helmholtz tuning of the box, if it has a port.
    pub fn tuning_frequency(&self) -> Option<f64> {
        match &self.load {
            Load::Ported(branch) => Some(branch.geometry.tuning_frequency(&self.medium)),
            _ => None,
        }
    }

    /// Source + coil → motor → suspension → diaphragm area.
    pub fn driver_matrix(&self, omega: f64) -> TransferMatrix {
        let stages: [&dyn NetworkElement; 4] =
            [&self.coil, &self.motor, &self.suspension, &self.diaphragm];
        stages
            .iter()
            .fold(TransferMatrix::identity(), |acc, stage| {
                acc.chain(&stage.transfer_matrix(omega, &self.medium))
            })
    }

    /// Acoustic radiation load of one diaphragm face into free air.
    fn free_air_load(&self, freq: f64, omega: f64) -> Complex64 {
        let a = self.driver.radius();
        match self.config.diaphragm_radiation {
            DiaphragmRadiation::Piston => {
                let k = Complex64::new(self.medium.free_wave_number(omega), 0.0);
                piston_impedance(k, a, &self.medium) / self.driver.sd
            }
            DiaphragmRadiation::Simplified => simplified_piston_impedance(freq, a),
        }
    }

    /// Acoustic radiation load of the diaphragm inside the lined box.
    fn lined_load(&self, freq: f64) -> Complex64 {
        let a = self.driver.radius();
        match self.config.diaphragm_radiation {
            DiaphragmRadiation::Piston => {
                piston_impedance(self.driver.wave_number(freq), a, &self.medium) / self.driver.sd
            }
            DiaphragmRadiation::Simplified => simplified_piston_impedance(freq, a),
        }
    }

    /// Thermoviscous boundary-layer term r_d of the port mouth.
    fn boundary_layer_term(&self, omega: f64, port_radius: f64) -> Complex64 {
        let rho = self.medium.density;
        let knudsen = self.medium.mean_free_path / port_radius;
        let slip = (2.0 / 0.9 - 1.0) * knudsen;
        let kv2 = Complex64::new(0.0, -omega * rho / self.medium.viscosity);
        -8.0 * rho / ((1.0 + 4.0 * slip) * kv2 * port_radius * port_radius)
    }

    /// Evaluate the full network at `freq` (Hz).
    ///
    /// Frequencies below [`FREQUENCY_FLOOR`] are evaluated at the floor.
    pub fn evaluate(&self, freq: f64) -> NetworkPoint {
        let f = freq.max(FREQUENCY_FLOOR);
        let omega = 2.0 * PI * f;
        let drive = Complex64::new(self.driver.drive_voltage(), 0.0);
        let front = self.driver_matrix(omega);

        let (total, volume_velocity, diaphragm_velocity, port_velocity, port_fallback) =
            match &self.load {
                Load::FreeAir => {
                    let load = self.free_air_load(f, omega) * 2.0;
                    let total = front.chain(&TransferMatrix::shunt(load));
                    let u = drive / total.a / load;
                    (total, u, u, None, false)
                }
                Load::Sealed(cabinet) => {
                    let zab = cabinet.box_impedance(
                        omega,
                        self.driver.radius(),
                        self.config.sealed_mass_loading,
                        &self.medium,
                    );
                    let total = TransferMatrix::cascade(&[
                        front,
                        TransferMatrix::series(self.lined_load(f)),
                        TransferMatrix::shunt(zab),
                    ]);
                    let u = drive / total.a / zab;
                    (total, u, u, None, false)
                }
                Load::Ported(branch) => {
                    let ported = &branch.geometry;
                    let zab = ported.cabinet.box_impedance(
                        omega,
                        self.driver.radius(),
                        self.config.ported_mass_loading,
                        &self.medium,
                    );
                    let k = self.driver.wave_number(f);
                    let r_d = self.boundary_layer_term(omega, ported.port.equivalent_radius());
                    let (zp, fallback) = branch.radiator.impedance(k, r_d, &self.medium);

                    // Leak ∥ box ∥ (port line → mouth), reused for the split.
                    let rear = TransferMatrix::cascade(&[
                        TransferMatrix::shunt(Complex64::new(branch.leakage_resistance, 0.0)),
                        TransferMatrix::shunt(zab),
                        branch.duct.transfer_matrix(omega, &self.medium),
                        TransferMatrix::shunt(zp),
                    ]);
                    let total = TransferMatrix::cascade(&[
                        front,
                        TransferMatrix::series(self.lined_load(f)),
                        rear,
                    ]);
                    let mouth_pressure = drive / total.a;
                    let u_port = mouth_pressure / zp;
                    let u_diaphragm = rear.c * mouth_pressure;
                    (total, u_diaphragm - u_port, u_diaphragm, Some(u_port), fallback)
                }
            };

        NetworkPoint {
            frequency: freq,
            impedance: total.open_circuit_impedance() - self.config.source_resistance,
            volume_velocity,
            diaphragm_velocity,
            port_velocity,
            port_fallback,
        }
    }
}
