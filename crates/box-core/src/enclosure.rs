//! Enclosure geometry and the lumped acoustic impedances of the box.

use crate::constants::{area_from_diameter, Medium};
use crate::error::{require_positive, Result, SimError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Internal box size, either as edges or as a volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CabinetSpec {
    /// Internal edge lengths (m).
    Dimensions { lx: f64, ly: f64, lz: f64 },
    /// Internal volume (m³); modelled as a cube.
    Volume { vb: f64 },
}

/// Port cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortShape {
    /// Rectangular slot (m).
    Rectangular { width: f64, height: f64 },
    /// Round tube (m).
    Circular { diameter: f64 },
    /// Known area (m²), shape unspecified.
    Area { area: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    /// Port length (m).
    pub length: f64,
    #[serde(flatten)]
    pub shape: PortShape,
}

/// Requested topology, as it arrives from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum EnclosureSpec {
    OpenAir,
    Sealed { cabinet: CabinetSpec },
    Ported { cabinet: CabinetSpec, port: PortSpec },
}

impl EnclosureSpec {
    /// Scenario key used in result envelopes.
    pub fn scenario(&self) -> &'static str {
        match self {
            EnclosureSpec::OpenAir => "open_air",
            EnclosureSpec::Sealed { .. } => "sealed",
            EnclosureSpec::Ported { .. } => "ported",
        }
    }
}

/// Validated rectangular box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cabinet {
    pub lx: f64,
    pub ly: f64,
    pub lz: f64,
}

impl Cabinet {
    pub fn from_spec(spec: &CabinetSpec) -> Result<Self> {
        match *spec {
            CabinetSpec::Dimensions { lx, ly, lz } => Ok(Self {
                lx: require_positive("lx", lx)?,
                ly: require_positive("ly", ly)?,
                lz: require_positive("lz", lz)?,
            }),
            CabinetSpec::Volume { vb } => {
                let edge = require_positive("vb", vb)?.cbrt();
                Ok(Self {
                    lx: edge,
                    ly: edge,
                    lz: edge,
                })
            }
        }
    }

    /// Internal volume Vb (m³).
    pub fn volume(&self) -> f64 {
        self.lx * self.ly * self.lz
    }

    /// Air part of the volume, Va = ¾Vb.
    fn air_volume(&self) -> f64 {
        0.75 * self.volume()
    }

    /// Lining part of the volume, Vm = ¼Vb.
    fn lining_volume(&self) -> f64 {
        0.25 * self.volume()
    }

    /// Compliances (C_AA, C_AM) of the air and of the lining.
    fn compliances(&self, medium: &Medium) -> (f64, f64) {
        let caa = self.air_volume() / (medium.adiabatic_index * medium.atmospheric_pressure);
        let cam = self.lining_volume() / medium.atmospheric_pressure;
        (caa, cam)
    }

    /// Lumped box impedance Z_ab seen by the rear of a diaphragm of radius
    /// `a`, with mass-loading coefficient `b`.
    pub fn box_impedance(&self, omega: f64, a: f64, b: f64, medium: &Medium) -> Complex64 {
        let rho = medium.density;
        let gamma = medium.adiabatic_index;
        let mass = b * rho / (PI * a);
        let (caa, cam) = self.compliances(medium);
        let reactance = omega * mass - 1.0 / (omega * (caa + cam));

        let ram = medium.characteristic_impedance() / (self.lx * self.ly);
        let volume_ratio = 1.0 + self.air_volume() / (gamma * self.lining_volume());
        let resistance =
            ram / (volume_ratio * volume_ratio + omega * omega * ram * ram * caa * caa);
        Complex64::new(resistance, reactance)
    }
}

/// Validated port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Port {
    pub length: f64,
    /// Cross-section S_p (m²).
    pub area: f64,
    /// Sides of the radiating rectangle (m). Non-rectangular ports radiate
    /// as the square of equal area.
    pub width: f64,
    pub height: f64,
}

impl Port {
    pub fn from_spec(spec: &PortSpec) -> Result<Self> {
        let length = require_positive("port_length", spec.length)?;
        let (area, width, height) = match spec.shape {
            PortShape::Rectangular { width, height } => {
                let width = require_positive("port_width", width)?;
                let height = require_positive("port_height", height)?;
                (width * height, width, height)
            }
            PortShape::Circular { diameter } => {
                let area = area_from_diameter(require_positive("port_diameter", diameter)?);
                (area, area.sqrt(), area.sqrt())
            }
            PortShape::Area { area } => {
                let area = require_positive("port_area", area)?;
                (area, area.sqrt(), area.sqrt())
            }
        };
        Ok(Self {
            length,
            area,
            width,
            height,
        })
    }

    /// Air volume inside the port.
    pub fn volume(&self) -> f64 {
        self.area * self.length
    }

    /// Radius of the circle with the port's area.
    pub fn equivalent_radius(&self) -> f64 {
        (self.area / PI).sqrt()
    }
}

/// Validated vented box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortedBox {
    pub cabinet: Cabinet,
    pub port: Port,
}

impl PortedBox {
    pub fn new(cabinet: Cabinet, port: Port) -> Result<Self> {
        if port.volume() >= cabinet.volume() {
            return Err(SimError::degenerate(format!(
                "port volume {:.3e} m³ does not fit in box volume {:.3e} m³",
                port.volume(),
                cabinet.volume()
            )));
        }
        Ok(Self { cabinet, port })
    }

    /// Box volume minus the port's own volume.
    pub fn effective_volume(&self) -> f64 {
        self.cabinet.volume() - self.port.volume()
    }

    /// Helmholtz tuning frequency f_b (Hz).
    pub fn tuning_frequency(&self, medium: &Medium) -> f64 {
        (medium.speed_of_sound / (2.0 * PI))
            * (self.port.area / (self.effective_volume() * self.port.length)).sqrt()
    }

    /// Leakage resistance R_al = Q_L / (2π f_b C_ab).
    pub fn leakage_resistance(&self, leakage_q: f64, medium: &Medium) -> f64 {
        let (caa, cam) = self.cabinet.compliances(medium);
        let cab = caa + medium.adiabatic_index * cam;
        leakage_q / (2.0 * PI * self.tuning_frequency(medium) * cab)
    }
}

/// Validated enclosure topology.
#[derive(Debug, Clone, PartialEq)]
pub enum Enclosure {
    OpenAir,
    Sealed(Cabinet),
    Ported(PortedBox),
}

impl Enclosure {
    pub fn from_spec(spec: &EnclosureSpec) -> Result<Self> {
        match spec {
            EnclosureSpec::OpenAir => Ok(Enclosure::OpenAir),
            EnclosureSpec::Sealed { cabinet } => Ok(Enclosure::Sealed(Cabinet::from_spec(cabinet)?)),
            EnclosureSpec::Ported { cabinet, port } => Ok(Enclosure::Ported(PortedBox::new(
                Cabinet::from_spec(cabinet)?,
                Port::from_spec(port)?,
            )?)),
        }
    }

    pub fn scenario(&self) -> &'static str {
        match self {
            Enclosure::OpenAir => "open_air",
            Enclosure::Sealed(_) => "sealed",
            Enclosure::Ported(_) => "ported",
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 60 L box with a 7 cm × 15 cm round port, tuned near 36 Hz.
    pub(crate) fn reference_ported_spec() -> EnclosureSpec {
        EnclosureSpec::Ported {
            cabinet: CabinetSpec::Dimensions {
                lx: 0.3,
                ly: 0.4,
                lz: 0.5,
            },
            port: PortSpec {
                length: 0.15,
                shape: PortShape::Circular { diameter: 0.07 },
            },
        }
    }

    #[test]
    fn test_volume_spec_is_a_cube() {
        let cabinet = Cabinet::from_spec(&CabinetSpec::Volume { vb: 0.027 }).unwrap();
        assert!((cabinet.lx - 0.3).abs() < 1e-12);
        assert!((cabinet.volume() - 0.027).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_degenerate_geometry() {
        let zero_volume = EnclosureSpec::Sealed {
            cabinet: CabinetSpec::Volume { vb: 0.0 },
        };
        assert!(Enclosure::from_spec(&zero_volume).is_err());

        let zero_port = EnclosureSpec::Ported {
            cabinet: CabinetSpec::Volume { vb: 0.05 },
            port: PortSpec {
                length: 0.1,
                shape: PortShape::Area { area: 0.0 },
            },
        };
        assert!(Enclosure::from_spec(&zero_port).is_err());

        let oversized_port = EnclosureSpec::Ported {
            cabinet: CabinetSpec::Volume { vb: 1e-3 },
            port: PortSpec {
                length: 1.0,
                shape: PortShape::Area { area: 0.01 },
            },
        };
        let err = Enclosure::from_spec(&oversized_port).unwrap_err();
        assert!(matches!(err, SimError::DegenerateGeometry { .. }), "{err}");
    }

    #[test]
    fn test_tuning_frequency() {
        let medium = Medium::default();
        let Enclosure::Ported(ported) = Enclosure::from_spec(&reference_ported_spec()).unwrap()
        else {
            panic!("expected a ported box");
        };
        let sp = area_from_diameter(0.07);
        let vab = 0.06 - sp * 0.15;
        let expected = medium.speed_of_sound / (2.0 * PI) * (sp / (vab * 0.15)).sqrt();
        let fb = ported.tuning_frequency(&medium);
        assert!((fb - expected).abs() < 1e-9);
        assert!(fb > 30.0 && fb < 40.0, "fb = {fb}");
    }

    #[test]
    fn test_round_port_radiates_as_equal_area_square() {
        let port = Port::from_spec(&PortSpec {
            length: 0.1,
            shape: PortShape::Circular { diameter: 0.05 },
        })
        .unwrap();
        assert_eq!(port.width, port.height);
        assert!((port.width * port.height - port.area).abs() < 1e-15);
        assert!((port.equivalent_radius() - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_box_impedance_stiffens_as_volume_shrinks() {
        let medium = Medium::default();
        let omega = 2.0 * PI * 30.0;
        let big = Cabinet { lx: 0.5, ly: 0.5, lz: 0.5 };
        let small = Cabinet { lx: 0.2, ly: 0.2, lz: 0.2 };
        let z_big = big.box_impedance(omega, 0.08, 0.46, &medium);
        let z_small = small.box_impedance(omega, 0.08, 0.46, &medium);
        assert!(z_small.im < z_big.im);
        assert!(z_small.im < 0.0);
    }

    #[test]
    fn test_leakage_resistance_is_large() {
        let medium = Medium::default();
        let Enclosure::Ported(ported) = Enclosure::from_spec(&reference_ported_spec()).unwrap()
        else {
            panic!("expected a ported box");
        };
        let ral = ported.leakage_resistance(7.0, &medium);
        let (caa, cam) = ported.cabinet.compliances(&medium);
        let reactance_at_fb =
            1.0 / (2.0 * PI * ported.tuning_frequency(&medium) * (caa + medium.adiabatic_index * cam));
        assert!((ral / reactance_at_fb - 7.0).abs() < 1e-9);
    }
}
