use crate::constants::{Medium, FREQUENCY_FLOOR, REFERENCE_POWER};
use crate::network::{NetworkPoint, SpeakerSystem};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::PI;

/// Sweep results, one entry per grid frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyResponse {
    pub scenario: String,
    /// Grid frequencies in Hz, ascending.
    pub frequencies: Vec<f64>,
    /// On-axis SPL at 1 m for 1 W into Znom (dB re 20 µPa).
    pub spl: Vec<f64>,
    /// Magnitude of the driver's input impedance (Ω).
    pub impedance: Vec<f64>,
    /// Radiated acoustic power (dB re 1 pW).
    pub power: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diaphragm_spl: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_spl: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuning_frequency: Option<f64>,
}

impl FrequencyResponse {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// `points` log-spaced frequencies from `f_min` to `f_max`, both included.
pub fn log_grid(f_min: f64, f_max: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![f_min],
        _ => {
            let (lo, hi) = (f_min.log10(), f_max.log10());
            let step = (hi - lo) / (points - 1) as f64;
            let mut grid: Vec<f64> = (0..points)
                .map(|i| 10f64.powf(lo + step * i as f64))
                .collect();
            grid[0] = f_min;
            grid[points - 1] = f_max;
            grid
        }
    }
}

/// Sound pressure level at 1 m of a simple source with volume velocity `u`:
/// 20·log₁₀(ρ₀·f·|U| / p_ref).
pub fn spl_db(u: Complex64, freq: f64, medium: &Medium) -> f64 {
    let pressure = medium.density * freq * u.norm();
    20.0 * (pressure / medium.reference_pressure).log10()
}

/// Radiated power of a simple source in dB re 1 pW:
/// W = |U|²ω²ρ₀ / (4πc).
pub fn power_db(u: Complex64, freq: f64, medium: &Medium) -> f64 {
    let omega = 2.0 * PI * freq;
    let watts = u.norm_sqr() * omega * omega * medium.density / (4.0 * PI * medium.speed_of_sound);
    10.0 * (watts / REFERENCE_POWER).log10()
}

/// Evaluate `system` at every frequency of `frequencies`.
///
/// Output order always follows the input order, whether or not the points
/// are computed on the rayon pool.
pub fn sweep(system: &SpeakerSystem, frequencies: &[f64]) -> FrequencyResponse {
    let config = system.config();
    let points: Vec<NetworkPoint> = if config.parallel {
        frequencies.par_iter().map(|&f| system.evaluate(f)).collect()
    } else {
        frequencies.iter().map(|&f| system.evaluate(f)).collect()
    };

    let fallbacks = points.iter().filter(|p| p.port_fallback).count();
    if fallbacks > 0 {
        log::debug!(
            "port radiation series unconverged at {fallbacks} of {} points; used ρc/S",
            points.len()
        );
    }

    let medium = system.medium();
    let level = |u: Complex64, f: f64| spl_db(u, f.max(FREQUENCY_FLOOR), medium);

    let spl = points.iter().map(|p| level(p.volume_velocity, p.frequency)).collect();
    let impedance = points.iter().map(|p| p.impedance.norm()).collect();
    let power = points
        .iter()
        .map(|p| power_db(p.volume_velocity, p.frequency.max(FREQUENCY_FLOOR), medium))
        .collect();

    let tuning_frequency = system.tuning_frequency();
    let split = config.split_contributions && tuning_frequency.is_some();
    let (diaphragm_spl, port_spl) = if split {
        let diaphragm = points
            .iter()
            .map(|p| level(p.diaphragm_velocity, p.frequency))
            .collect();
        let port = points
            .iter()
            .map(|p| level(p.port_velocity.unwrap_or_default(), p.frequency))
            .collect();
        (Some(diaphragm), Some(port))
    } else {
        (None, None)
    };

    FrequencyResponse {
        scenario: system.enclosure().scenario().to_string(),
        frequencies: frequencies.to_vec(),
        spl,
        impedance,
        power,
        diaphragm_spl,
        port_spl,
        tuning_frequency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::driver::tests::reference_params;
    use crate::driver::Driver;
    use crate::enclosure::tests::reference_ported_spec;
    use crate::enclosure::{Enclosure, EnclosureSpec};

    fn system(spec: &EnclosureSpec, config: EngineConfig) -> SpeakerSystem {
        let medium = Medium::default();
        let driver = Driver::new(&reference_params(), &medium).unwrap();
        SpeakerSystem::new(driver, Enclosure::from_spec(spec).unwrap(), medium, config)
    }

    #[test]
    fn test_log_grid_endpoints_and_spacing() {
        let grid = log_grid(20.0, 20_000.0, 957);
        assert_eq!(grid.len(), 957);
        assert_eq!(grid[0], 20.0);
        assert_eq!(grid[956], 20_000.0);

        let ratio = grid[1] / grid[0];
        for pair in grid.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] / pair[0] - ratio).abs() < 1e-9);
        }
    }

    #[test]
    fn test_log_grid_small_counts() {
        assert!(log_grid(20.0, 200.0, 0).is_empty());
        assert_eq!(log_grid(20.0, 200.0, 1), vec![20.0]);
        assert_eq!(log_grid(20.0, 200.0, 2), vec![20.0, 200.0]);
    }

    #[test]
    fn test_spl_of_known_source() {
        // ρ·f·|U| = p_ref · 10  →  20 dB
        let medium = Medium::default();
        let freq = 100.0;
        let u = medium.reference_pressure * 10.0 / (medium.density * freq);
        let spl = spl_db(Complex64::new(0.0, u), freq, &medium);
        assert!((spl - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_scales_with_square_of_velocity() {
        let medium = Medium::default();
        let u = Complex64::new(1e-4, 0.0);
        let delta = power_db(u * 2.0, 100.0, &medium) - power_db(u, 100.0, &medium);
        assert!((delta - 20.0 * 2f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_output_lengths() {
        let sys = system(&EnclosureSpec::OpenAir, EngineConfig::default());
        let grid = log_grid(20.0, 20_000.0, 101);
        let response = sweep(&sys, &grid);
        assert_eq!(response.len(), 101);
        assert_eq!(response.spl.len(), 101);
        assert_eq!(response.impedance.len(), 101);
        assert_eq!(response.power.len(), 101);
        assert_eq!(response.scenario, "open_air");
        assert!(response.diaphragm_spl.is_none());
        assert!(response.tuning_frequency.is_none());
        assert!(response.spl.iter().all(|v| v.is_finite()));
        assert!(response.impedance.iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let grid = log_grid(20.0, 20_000.0, 200);
        let parallel = sweep(&system(&reference_ported_spec(), EngineConfig::default()), &grid);
        let sequential = sweep(
            &system(
                &reference_ported_spec(),
                EngineConfig {
                    parallel: false,
                    ..EngineConfig::default()
                },
            ),
            &grid,
        );
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_split_contributions_only_for_ported() {
        let config = EngineConfig {
            split_contributions: true,
            ..EngineConfig::default()
        };
        let grid = log_grid(20.0, 2_000.0, 50);

        let ported = sweep(&system(&reference_ported_spec(), config.clone()), &grid);
        assert_eq!(ported.diaphragm_spl.as_ref().map(Vec::len), Some(50));
        assert_eq!(ported.port_spl.as_ref().map(Vec::len), Some(50));
        assert!(ported.tuning_frequency.is_some());

        let open = sweep(&system(&EnclosureSpec::OpenAir, config), &grid);
        assert!(open.diaphragm_spl.is_none());
        assert!(open.port_spl.is_none());
    }

    #[test]
    fn test_log_grid_midpoint_is_geometric_mean() {
        let grid = log_grid(20.0, 200.0, 3);
        assert!((grid[1] - (20.0f64 * 200.0).sqrt()).abs() < 1e-9);
    }
}
