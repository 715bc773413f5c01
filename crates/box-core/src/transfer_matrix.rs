use num_complex::Complex64;

/// A 2×2 complex transfer (ABCD) matrix representing one network stage.
///
/// ```text
/// [effort_in]   [a  b] [effort_out]
/// [flow_in  ] = [c  d] [flow_out  ]
/// ```
///
/// Effort/flow are voltage/current, force/velocity or pressure/volume
/// velocity depending on the domain the stage lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferMatrix {
    pub a: Complex64,
    pub b: Complex64,
    pub c: Complex64,
    pub d: Complex64,
}

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

impl TransferMatrix {
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { a, b, c, d }
    }

    /// Identity matrix (no-op stage).
    pub fn identity() -> Self {
        Self::new(ONE, ZERO, ZERO, ONE)
    }

    /// Series impedance `z`.
    pub fn series(z: Complex64) -> Self {
        Self::new(ONE, z, ZERO, ONE)
    }

    /// Shunt impedance `z` (admittance 1/z across the line).
    pub fn shunt(z: Complex64) -> Self {
        Self::new(ONE, ZERO, z.inv(), ONE)
    }

    /// Gyrator coupling two domains with transduction coefficient `bl`.
    pub fn gyrator(bl: f64) -> Self {
        Self::new(
            ZERO,
            Complex64::new(bl, 0.0),
            Complex64::new(1.0 / bl, 0.0),
            ZERO,
        )
    }

    /// Ideal transformer with area ratio `s` (force ↔ pressure).
    pub fn transformer(s: f64) -> Self {
        Self::new(Complex64::new(s, 0.0), ZERO, ZERO, Complex64::new(1.0 / s, 0.0))
    }

    /// Uniform transmission line with propagation `gamma_l` (= k·l) and
    /// characteristic impedance `z0`.
    pub fn line(gamma_l: Complex64, z0: Complex64) -> Self {
        let j = Complex64::i();
        let (cos, sin) = (gamma_l.cos(), gamma_l.sin());
        Self::new(cos, j * z0 * sin, j * sin / z0, cos)
    }

    /// Chain (multiply) this matrix with another: self · other.
    pub fn chain(&self, other: &TransferMatrix) -> TransferMatrix {
        TransferMatrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
        }
    }

    /// Left-to-right product of `stages`.
    pub fn cascade<'a>(stages: impl IntoIterator<Item = &'a TransferMatrix>) -> TransferMatrix {
        stages
            .into_iter()
            .fold(TransferMatrix::identity(), |acc, m| acc.chain(m))
    }

    /// Input impedance with the output port left open: a/c.
    pub fn open_circuit_impedance(&self) -> Complex64 {
        self.a / self.c
    }

    pub fn determinant(&self) -> Complex64 {
        self.a * self.d - self.b * self.c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_chain() {
        let id = TransferMatrix::identity();
        let m = TransferMatrix::new(
            Complex64::new(1.0, 0.5),
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(1.0, 0.5),
        );
        let result = id.chain(&m);
        assert!((result.a - m.a).norm() < 1e-12);
        assert!((result.b - m.b).norm() < 1e-12);
        assert!((result.c - m.c).norm() < 1e-12);
        assert!((result.d - m.d).norm() < 1e-12);
    }

    #[test]
    fn test_line_is_reciprocal() {
        // det = cos² + sin² = 1, also for complex propagation
        let m = TransferMatrix::line(Complex64::new(0.7, -0.01), Complex64::new(2.4e5, 240.0));
        let det = m.determinant();
        assert!((det - ONE).norm() < 1e-12, "det = {det}");
    }

    #[test]
    fn test_series_then_shunt_divider() {
        // Z_in of series R followed by shunt Z, output open: R + Z
        let r = Complex64::new(6.0, 0.0);
        let z = Complex64::new(2.0, 3.0);
        let total = TransferMatrix::cascade(&[TransferMatrix::series(r), TransferMatrix::shunt(z)]);
        assert!((total.open_circuit_impedance() - (r + z)).norm() < 1e-12);
    }

    #[test]
    fn test_gyrator_inverts_load() {
        // A gyrator terminated in Z presents Bl²/Z.
        let bl = 8.0;
        let z = Complex64::new(1.5, -4.0);
        let total = TransferMatrix::gyrator(bl).chain(&TransferMatrix::shunt(z));
        let expected = Complex64::new(bl * bl, 0.0) / z;
        assert!((total.open_circuit_impedance() - expected).norm() < 1e-10);
    }

    #[test]
    fn test_transformer_scales_by_area_squared() {
        let s = 0.02;
        let z = Complex64::new(5000.0, 2000.0);
        let total = TransferMatrix::transformer(s).chain(&TransferMatrix::shunt(z));
        assert!((total.open_circuit_impedance() - z * s * s).norm() < 1e-9);
    }

    #[test]
    fn test_cascade_matches_manual_chain() {
        let stages = [
            TransferMatrix::series(Complex64::new(1.0, 2.0)),
            TransferMatrix::gyrator(3.0),
            TransferMatrix::transformer(0.5),
        ];
        let manual = stages[0].chain(&stages[1]).chain(&stages[2]);
        assert_eq!(TransferMatrix::cascade(&stages), manual);
    }
}
