use std::f64::consts::PI;

use nalgebra::{Cholesky, Matrix2, Vector2};

use crate::math::{inverse_unchecked, quadratic_form};

/// A bivariate normal distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian2D {
    pub mean: Vector2<f64>,
    pub covariance: Matrix2<f64>,
}

impl Default for Gaussian2D {
    fn default() -> Self {
        Self {
            mean: Vector2::new(0.0, 0.0),
            covariance: Matrix2::identity(),
        }
    }
}

impl Gaussian2D {
    pub fn new(mean: Vector2<f64>, covariance: Matrix2<f64>) -> Self {
        Self { mean, covariance }
    }

    /// Evaluates the probability density function at `point`:
    ///
    /// `(2π)⁻¹ |Σ|^(-1/2) exp(-½ (x-μ)ᵀ Σ⁻¹ (x-μ))`
    ///
    /// The covariance is assumed to be symmetric and positive-definite. Nothing is validated here,
    /// an invalid matrix gives a meaningless (possibly negative, infinite or NaN) value.
    pub fn pdf(&self, point: &Vector2<f64>) -> f64 {
        let det = self.covariance.determinant();
        let diff = point - self.mean;
        let exponent = -0.5 * quadratic_form(&inverse_unchecked(&self.covariance), &diff);

        exponent.exp() / (2.0 * PI * det.sqrt())
    }

    /// Returns true if the covariance is symmetric and admits a Cholesky factorization.
    pub fn is_positive_definite(&self) -> bool {
        let c = &self.covariance;
        c.iter().all(|v| v.is_finite())
            && (c[(0, 1)] - c[(1, 0)]).abs() <= f64::EPSILON * c.amax().max(1.0)
            && Cholesky::new(*c).is_some()
    }
}

/// Adds `epsilon` to the diagonal of `covariance`, pushing a positive semi-definite matrix
/// towards positive-definiteness.
pub fn regularize(covariance: Matrix2<f64>, epsilon: f64) -> Matrix2<f64> {
    covariance + Matrix2::identity() * epsilon
}
