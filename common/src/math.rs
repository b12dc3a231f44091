use nalgebra::{Matrix2, Vector2};

/// Inverse of a 2x2 matrix through its adjugate.
///
/// Unlike `try_inverse` there is no check for singular input: a zero determinant yields infinite
/// or NaN entries, which is left to the caller to avoid (e.g. by regularizing the diagonal).
pub fn inverse_unchecked(m: &Matrix2<f64>) -> Matrix2<f64> {
    let det = m.determinant();
    Matrix2::new(m[(1, 1)], -m[(0, 1)], -m[(1, 0)], m[(0, 0)]) / det
}

/// Evaluates `vᵀ M v`.
pub fn quadratic_form(m: &Matrix2<f64>, v: &Vector2<f64>) -> f64 {
    v.dot(&(m * v))
}
