//! Radiation impedances of the diaphragm and of the port mouth.

use crate::constants::Medium;
use crate::special::{bessel_j1, binomial, factorial, gamma, hyp2f1_half_shift, struve_h1};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Relative size of the last truncated terms above which the rectangular
/// series is considered unconverged.
const SERIES_CONVERGENCE_TOL: f64 = 1e-6;

/// Specific radiation impedance of a baffled circular piston of radius `a`
/// (Pa·s/m):
///
/// ```text
/// Z = ρ₀c·[1 − J₁(2ka)/(ka)] + j·ρ₀c·H₁(2ka)/(ka)
/// ```
///
/// `k` may be complex (lossy medium). Divide by the piston area for the
/// acoustic impedance.
pub fn piston_impedance(k: Complex64, a: f64, medium: &Medium) -> Complex64 {
    let rho_c = medium.characteristic_impedance();
    let ka = k * a;
    let two_ka = ka * 2.0;
    let resistance = rho_c * (1.0 - bessel_j1(two_ka) / ka);
    let reactance = rho_c * struve_h1(two_ka) / ka;
    resistance + Complex64::i() * reactance
}

/// Low-frequency approximation of the diaphragm's acoustic radiation
/// impedance: R = 0.01076·f², X = 1.5·f/a.
pub fn simplified_piston_impedance(freq: f64, a: f64) -> Complex64 {
    Complex64::new(0.01076 * freq * freq, 1.5 * freq / a)
}

/// Radiation impedance of a rectangular port mouth.
///
/// Every frequency-independent factor of the two double series is computed
/// once here, so evaluating the impedance per frequency is only a pair of
/// polynomial sums.
#[derive(Debug, Clone)]
pub struct RectangularRadiator {
    /// Side along which q is measured (m).
    lx: f64,
    /// Other side (m).
    ly: f64,
    /// Port cross-section used to turn the specific impedance into an
    /// acoustic one (m²).
    area: f64,
    truncation: usize,
    /// (−1)^(m+n) / ((2m+1)(2n+1)(m+1)!(n+1)! Γ(m+n+3/2)), row-major.
    resistance_coefs: Vec<f64>,
    /// (−1)^m f_m(q) / ((2m+1) m! (m+1)!).
    reactance_coefs: Vec<f64>,
}

impl RectangularRadiator {
    pub fn new(lx: f64, ly: f64, area: f64, truncation: usize) -> Self {
        let q = lx / ly;
        let size = truncation + 1;

        let mut resistance_coefs = Vec::with_capacity(size * size);
        for m in 0..size {
            for n in 0..size {
                let sign = if (m + n) % 2 == 0 { 1.0 } else { -1.0 };
                let denom = ((2 * m + 1) * (2 * n + 1)) as f64
                    * factorial(m as u32 + 1)
                    * factorial(n as u32 + 1)
                    * gamma((m + n) as f64 + 1.5);
                resistance_coefs.push(sign / denom);
            }
        }

        let reactance_coefs = (0..size)
            .map(|m| {
                let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
                let denom = (2 * m + 1) as f64 * factorial(m as u32) * factorial(m as u32 + 1);
                sign * aspect_function(m as u32, q) / denom
            })
            .collect();

        Self {
            lx,
            ly,
            area,
            truncation,
            resistance_coefs,
            reactance_coefs,
        }
    }

    /// Port aspect ratio q = lx/ly.
    pub fn aspect_ratio(&self) -> f64 {
        self.lx / self.ly
    }

    /// Acoustic radiation impedance (Pa·s/m³) for wave number `k`.
    ///
    /// `r_d` is the thermoviscous boundary-layer term scaling the reactance.
    /// Returns `None` when the truncated series has not converged at this
    /// `k`.
    fn series_impedance(
        &self,
        k: Complex64,
        r_d: Complex64,
        medium: &Medium,
    ) -> Option<Complex64> {
        let c = medium.speed_of_sound;
        let size = self.truncation + 1;
        let q = self.aspect_ratio();
        let half_x = k * self.lx * 0.5;
        let half_y = k * self.ly * 0.5;

        let pow_x = odd_powers(half_x, size);
        let pow_y = odd_powers(half_y, size);

        let mut sum_r = Complex64::new(0.0, 0.0);
        let mut border = 0.0f64;
        for m in 0..size {
            for n in 0..size {
                let term = self.resistance_coefs[m * size + n] * pow_x[m] * pow_y[n];
                sum_r += term;
                if m == self.truncation || n == self.truncation {
                    border = border.max(term.norm());
                }
            }
        }

        let mut sum_x = Complex64::new(0.0, 0.0);
        for (coef, p) in self.reactance_coefs.iter().zip(&pow_x) {
            sum_x += *coef * *p;
        }
        let last_x = (self.reactance_coefs[self.truncation] * pow_x[self.truncation]).norm();

        let converged = sum_r.is_finite()
            && sum_x.is_finite()
            && border <= SERIES_CONVERGENCE_TOL * sum_r.norm().max(f64::MIN_POSITIVE)
            && last_x <= SERIES_CONVERGENCE_TOL * sum_x.norm().max(f64::MIN_POSITIVE);
        if !converged {
            return None;
        }

        let kl = k * self.lx;
        let near_field = if kl.norm() < 1e-9 {
            Complex64::new(0.0, 0.0)
        } else {
            (1.0 - sinc(kl)) / (q * kl) + (1.0 - sinc(q * kl)) / kl
        };

        let resistance = medium.characteristic_impedance() / PI.sqrt() * sum_r;
        let reactance = (2.0 * r_d * c / PI.sqrt()) * (near_field + sum_x);
        Some((resistance + Complex64::i() * reactance) / self.area)
    }

    /// Acoustic radiation impedance, falling back to ρ₀c/S when the series
    /// cannot be trusted at this `k`. The flag is `true` on fallback.
    pub fn impedance(&self, k: Complex64, r_d: Complex64, medium: &Medium) -> (Complex64, bool) {
        match self.series_impedance(k, r_d, medium) {
            Some(z) => (z, false),
            None => (self.high_frequency_limit(medium), true),
        }
    }

    /// Impedance of a large radiator: pure resistance ρ₀c/S.
    fn high_frequency_limit(&self, medium: &Medium) -> Complex64 {
        Complex64::new(medium.characteristic_impedance() / self.area, 0.0)
    }
}

/// z^(2i+1) for i = 0..count.
fn odd_powers(z: Complex64, count: usize) -> Vec<Complex64> {
    let z2 = z * z;
    let mut out = Vec::with_capacity(count);
    let mut p = z;
    for _ in 0..count {
        out.push(p);
        p *= z2;
    }
    out
}

/// Normalized sinc, sin(πx)/(πx).
fn sinc(x: Complex64) -> Complex64 {
    if x.norm() < 1e-12 {
        return Complex64::new(1.0, 0.0);
    }
    let px = x * PI;
    px.sin() / px
}

/// f_m(q) of the rectangular mutual-impedance reactance.
fn aspect_function(m: u32, q: f64) -> f64 {
    let b = m as f64 + 0.5;
    let inv_q2 = 1.0 / (q * q);
    let h1 = hyp2f1_half_shift(m, 1.0 / (1.0 + q * q));
    let h2 = hyp2f1_half_shift(m, 1.0 / (1.0 + inv_q2));
    let g_sum: f64 = (0..=m).map(|n| aspect_g(m, n, q)).sum();
    (h1 + h2) / ((2 * m + 1) as f64 * (1.0 + inv_q2).powf(b)) + g_sum / (2 * m + 3) as f64
}

/// g(m, n, q), the nested binomial double sum inside f_m.
fn aspect_g(m: u32, n: u32, q: f64) -> f64 {
    let q2 = q * q;
    let inv_q2 = 1.0 / q2;

    let first: f64 = (n..=m)
        .map(|p| {
            let sign = if (p - n) % 2 == 0 { 1.0 } else { -1.0 };
            let pf = p as f64;
            sign * q.powi(2 * n as i32 - 1) / ((2.0 * pf - 1.0) * (1.0 + q2).powf(pf - 0.5))
                * binomial(m - n, p - n)
        })
        .sum();

    let second: f64 = (m - n..=m)
        .map(|p| {
            let j = p + n - m;
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            let pf = p as f64;
            binomial(j, n) * sign * q.powi(2 * n as i32 + 2)
                / ((2.0 * pf - 1.0) * (1.0 + inv_q2).powf(pf - 0.5))
        })
        .sum();

    binomial(2 * m + 3, 2 * n) * first + binomial(2 * m + 3, 2 * n + 3) * second
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enclosure::{Port, PortShape, PortSpec};

    fn k_real(k: f64) -> Complex64 {
        Complex64::new(k, 0.0)
    }

    #[test]
    fn test_piston_low_frequency_limits() {
        // ka ≪ 1: R ≈ ρc(ka)²/2, X ≈ ρc·8ka/(3π)
        let medium = Medium::default();
        let rho_c = medium.characteristic_impedance();
        let (k, a) = (0.05, 0.1);
        let ka: f64 = k * a;
        let z = piston_impedance(k_real(k), a, &medium);
        assert!((z.re / (rho_c * ka * ka / 2.0) - 1.0).abs() < 1e-3, "R = {}", z.re);
        assert!((z.im / (rho_c * 8.0 * ka / (3.0 * PI)) - 1.0).abs() < 1e-3, "X = {}", z.im);
    }

    #[test]
    fn test_piston_high_frequency_limit() {
        // ka ≫ 1: R → ρc, X → 0
        let medium = Medium::default();
        let rho_c = medium.characteristic_impedance();
        let z = piston_impedance(k_real(400.0), 0.1, &medium);
        assert!((z.re / rho_c - 1.0).abs() < 0.01, "R = {}", z.re);
        assert!(z.im.abs() / rho_c < 0.05, "X = {}", z.im);
    }

    #[test]
    fn test_piston_accepts_lossy_wave_number() {
        let medium = Medium::default();
        let z = piston_impedance(Complex64::new(2.0, -0.3), 0.08, &medium);
        assert!(z.is_finite());
        assert!(z.re > 0.0);
    }

    #[test]
    fn test_simplified_piston() {
        let z = simplified_piston_impedance(100.0, 0.05);
        assert!((z.re - 107.6).abs() < 1e-9);
        assert!((z.im - 3000.0).abs() < 1e-9);
    }

    fn port_radiator(shape: PortShape) -> RectangularRadiator {
        let port = Port::from_spec(&PortSpec { length: 0.1, shape }).unwrap();
        RectangularRadiator::new(port.width, port.height, port.area, 10)
    }

    #[test]
    fn test_square_port_matches_area_port() {
        let medium = Medium::default();
        let side = 0.06;
        let square = port_radiator(PortShape::Rectangular {
            width: side,
            height: side,
        });
        let by_area = port_radiator(PortShape::Area { area: side * side });
        assert!((square.aspect_ratio() - 1.0).abs() < 1e-12);
        assert!((by_area.aspect_ratio() - 1.0).abs() < 1e-12);
        let r_d = Complex64::new(0.0, -2e-3);
        for k in [0.3, 2.0, 15.0, 60.0] {
            let k = Complex64::new(k, -0.01 * k);
            let (za, fa) = square.impedance(k, r_d, &medium);
            let (zb, fb) = by_area.impedance(k, r_d, &medium);
            assert_eq!(fa, fb);
            assert!((za - zb).norm() <= 1e-9 * za.norm(), "{za} vs {zb}");
        }
    }

    #[test]
    fn test_resistance_invariant_under_side_swap() {
        let medium = Medium::default();
        let (lx, ly) = (0.08, 0.05);
        let wide = RectangularRadiator::new(lx, ly, lx * ly, 10);
        let tall = RectangularRadiator::new(ly, lx, lx * ly, 10);
        assert!((wide.aspect_ratio() * tall.aspect_ratio() - 1.0).abs() < 1e-12);
        let r_d = Complex64::new(0.0, 0.0);
        for k in [0.5, 3.0, 10.0] {
            let (za, fa) = wide.impedance(k_real(k), r_d, &medium);
            let (zb, fb) = tall.impedance(k_real(k), r_d, &medium);
            assert!(!fa && !fb);
            assert!((za.re / zb.re - 1.0).abs() < 1e-9, "{} vs {}", za.re, zb.re);
        }
    }

    #[test]
    fn test_resistance_matches_baffled_piston_at_low_frequency() {
        // Low ka: R_s → ρc·k²·lx·ly/(2π), the small-piston limit.
        let medium = Medium::default();
        let (lx, ly) = (0.08, 0.05);
        let radiator = RectangularRadiator::new(lx, ly, lx * ly, 10);
        let k = 0.5;
        let z = radiator
            .series_impedance(k_real(k), Complex64::new(0.0, 0.0), &medium)
            .unwrap();
        let expected = medium.characteristic_impedance() * k * k * lx * ly / (2.0 * PI) / (lx * ly);
        assert!((z.re / expected - 1.0).abs() < 1e-3, "R = {} vs {}", z.re, expected);
    }

    #[test]
    fn test_series_converges_with_truncation() {
        let medium = Medium::default();
        let side = 0.06;
        let r_d = Complex64::new(0.0, -1e-3);
        let k = Complex64::new(20.0, -0.2); // k·l/2 = 0.6
        let (z5, _) = RectangularRadiator::new(side, side, side * side, 5).impedance(k, r_d, &medium);
        let (z10, fallback) =
            RectangularRadiator::new(side, side, side * side, 10).impedance(k, r_d, &medium);
        assert!(!fallback);
        assert!((z5 - z10).norm() / z10.norm() < 1e-6, "{z5} vs {z10}");
    }

    #[test]
    fn test_unconverged_series_falls_back() {
        let medium = Medium::default();
        let side = 0.06;
        let radiator = RectangularRadiator::new(side, side, side * side, 10);
        let k = k_real(360.0); // k·l/2 ≈ 10.8
        let r_d = Complex64::new(0.0, -1e-4);
        assert!(radiator.series_impedance(k, r_d, &medium).is_none());
        assert_eq!(
            radiator.impedance(k, r_d, &medium),
            (radiator.high_frequency_limit(&medium), true)
        );
    }

    #[test]
    fn test_near_dc_is_finite() {
        let medium = Medium::default();
        let radiator = RectangularRadiator::new(0.05, 0.05, 0.0025, 10);
        let (z, fallback) = radiator.impedance(k_real(1e-12), Complex64::new(0.0, -1.0), &medium);
        assert!(z.is_finite(), "{z}");
        assert!(!fallback);
    }

    #[test]
    fn test_aspect_function_is_finite_for_wide_ports() {
        for q in [0.1, 0.5, 1.0, 2.0, 10.0] {
            for m in 0..=10 {
                let f = aspect_function(m, q);
                assert!(f.is_finite(), "f_{m}({q}) = {f}");
            }
        }
    }
}
