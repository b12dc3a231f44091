use common::gaussian::Gaussian2D;
use nalgebra::{Matrix2, Vector2};

/// One weighted bivariate normal of a mixture. The first feature is the speed, the second the
/// direction (in radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianComponent {
    pub gaussian: Gaussian2D,

    /// unnormalized contribution to the mixture
    pub weight: f64,
}

impl GaussianComponent {
    pub fn mean(&self) -> Vector2<f64> {
        self.gaussian.mean
    }

    pub fn covariance(&self) -> Matrix2<f64> {
        self.gaussian.covariance
    }

    pub fn direction(&self) -> f64 {
        self.gaussian.mean.y
    }

    /// Weighted density of this component at `point`.
    pub fn density(&self, point: &Vector2<f64>) -> f64 {
        self.weight * self.gaussian.pdf(point)
    }
}

/// Gaussian mixture model attached to a single grid cell.
///
/// Components are only ever appended, the insertion order is kept and determines the order of
/// [`MixtureCell::mean_directions`].
#[derive(Debug, Clone, Default)]
pub struct MixtureCell {
    components: Vec<GaussianComponent>,
}

impl MixtureCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a component. Neither the covariance nor the weight is validated.
    pub fn add_component(&mut self, mean: Vector2<f64>, covariance: Matrix2<f64>, weight: f64) {
        self.components.push(GaussianComponent {
            gaussian: Gaussian2D::new(mean, covariance),
            weight,
        });
    }

    /// Weighted sum of the component densities at `point`. No normalization of the weights is
    /// done, an empty cell gives exactly zero.
    pub fn probability_density(&self, point: &Vector2<f64>) -> f64 {
        self.components.iter().map(|c| c.density(point)).sum()
    }

    /// The direction (second mean coordinate) of every component, in insertion order.
    pub fn mean_directions(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.direction()).collect()
    }

    pub fn components(&self) -> &[GaussianComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
