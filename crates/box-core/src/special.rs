//! Special functions feeding the radiation impedance formulas.
//!
//! J₁ and H₁ accept complex arguments because the wave number inside a lined
//! enclosure is complex. Small arguments use the power series, large ones the
//! Hankel asymptotic expansion; the crossover points keep both branches
//! within ~1e-10 of the exact value.

use num_complex::Complex64;
use std::f64::consts::PI;

const SERIES_TOL: f64 = 1e-17;
const MAX_SERIES_TERMS: usize = 500;

/// |z| below which J₁ is summed from its power series.
const BESSEL_SERIES_LIMIT: f64 = 12.0;
/// |z| below which H₁ is summed from its power series.
const STRUVE_SERIES_LIMIT: f64 = 20.0;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEF: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Gamma function for real arguments (Lanczos approximation, reflection
/// below 1/2).
pub fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let mut acc = LANCZOS_COEF[0];
    for (i, &c) in LANCZOS_COEF.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    (2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * acc
}

/// n! as a float.
pub fn factorial(n: u32) -> f64 {
    (2..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Binomial coefficient C(n, k); zero when k > n.
pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Gauss hypergeometric function ₂F₁(a, b; c; x) for real |x| < 1.
///
/// Plain series summation. Loses accuracy as x approaches 1 because the
/// term count is capped; use [`hyp2f1_half_shift`] for that regime.
pub fn hyp2f1(a: f64, b: f64, c: f64, x: f64) -> f64 {
    debug_assert!(x.abs() < 1.0, "hyp2f1 series needs |x| < 1, got {x}");
    let mut term = 1.0;
    let mut sum = 1.0;
    for n in 0..200_000 {
        let n = n as f64;
        term *= (a + n) * (b + n) / ((c + n) * (n + 1.0)) * x;
        sum += term;
        if term.abs() < 1e-16 * sum.abs() {
            break;
        }
    }
    sum
}

/// ₂F₁(1, m+½; m+3/2; x) for 0 ≤ x < 1.
///
/// Above x = 0.9 the closed form
///
/// ```text
/// (2m+1)·y^-(2m+1)·[atanh(y) − Σ_{j<m} y^(2j+1)/(2j+1)],  y = √x
/// ```
///
/// replaces the series, which converges too slowly near 1.
pub fn hyp2f1_half_shift(m: u32, x: f64) -> f64 {
    let b = m as f64 + 0.5;
    if x <= 0.9 {
        return hyp2f1(1.0, b, b + 1.0, x);
    }
    let y = x.sqrt();
    let partial: f64 = (0..m)
        .map(|j| y.powi(2 * j as i32 + 1) / (2 * j + 1) as f64)
        .sum();
    (2 * m + 1) as f64 * (y.atanh() - partial) / y.powi(2 * m as i32 + 1)
}

/// Bessel function of the first kind, order one.
pub fn bessel_j1(z: Complex64) -> Complex64 {
    if z.norm() < BESSEL_SERIES_LIMIT {
        bessel_j1_series(z)
    } else {
        let (p, q) = hankel_pq(z);
        let chi = z - 0.75 * PI;
        hankel_scale(z) * (p * chi.cos() - q * chi.sin())
    }
}

/// Bessel function of the second kind, order one. Only the asymptotic
/// branch is needed (large-argument Struve evaluation).
fn bessel_y1_asymptotic(z: Complex64) -> Complex64 {
    let (p, q) = hankel_pq(z);
    let chi = z - 0.75 * PI;
    hankel_scale(z) * (p * chi.sin() + q * chi.cos())
}

/// Struve function H₁.
pub fn struve_h1(z: Complex64) -> Complex64 {
    if z.norm() < STRUVE_SERIES_LIMIT {
        struve_h1_series(z)
    } else {
        // H₁(z) − Y₁(z) ~ (1/π) Σ Γ(k+½) (z/2)^(−2k) / Γ(3/2−k)
        let h2 = (z * 0.5).powi(2);
        let mut term = Complex64::new(2.0, 0.0);
        let mut sum = term;
        for k in 1..30 {
            let k = k as f64;
            let next = term * ((k - 0.5) * (1.5 - k)) / h2;
            if next.norm() > term.norm() {
                break;
            }
            term = next;
            sum += term;
            if term.norm() < SERIES_TOL * sum.norm() {
                break;
            }
        }
        bessel_y1_asymptotic(z) + sum / PI
    }
}

fn bessel_j1_series(z: Complex64) -> Complex64 {
    let half = z * 0.5;
    let h2 = half * half;
    let mut term = half;
    let mut sum = term;
    for k in 1..MAX_SERIES_TERMS {
        let k = k as f64;
        term *= -h2 / (k * (k + 1.0));
        sum += term;
        if term.norm() < SERIES_TOL * sum.norm() {
            break;
        }
    }
    sum
}

fn struve_h1_series(z: Complex64) -> Complex64 {
    let half = z * 0.5;
    let h2 = half * half;
    // Γ(3/2)·Γ(5/2) = 3π/8
    let mut term = h2 / (3.0 * PI / 8.0);
    let mut sum = term;
    for k in 1..MAX_SERIES_TERMS {
        let k = k as f64;
        term *= -h2 / ((k + 0.5) * (k + 1.5));
        sum += term;
        if term.norm() < SERIES_TOL * sum.norm() {
            break;
        }
    }
    sum
}

fn hankel_scale(z: Complex64) -> Complex64 {
    (Complex64::new(2.0 / PI, 0.0) / z).sqrt()
}

/// P and Q of Hankel's expansion for order one, summed up to the smallest
/// term.
fn hankel_pq(z: Complex64) -> (Complex64, Complex64) {
    const MU: f64 = 4.0;
    let mut p = Complex64::new(0.0, 0.0);
    let mut q = Complex64::new(0.0, 0.0);
    let mut term = Complex64::new(1.0, 0.0);
    for k in 0..60usize {
        let sign = if (k / 2) % 2 == 0 { 1.0 } else { -1.0 };
        if k % 2 == 0 {
            p += term * sign;
        } else {
            q += term * sign;
        }
        let n = (k + 1) as f64;
        let odd = 2.0 * n - 1.0;
        let next = term * (MU - odd * odd) / (z * (8.0 * n));
        if next.norm() > term.norm() || next.norm() < SERIES_TOL {
            break;
        }
        term = next;
    }
    (p, q)
}
