use nalgebra::{Matrix2, Vector2};
use serde::Deserialize;

use crate::grid::{Cell, SpatialGrid};

/// Diagonal term added to every covariance read from a record, keeps the matrices
/// positive-definite.
pub const DEFAULT_REGULARIZATION: f64 = 0.1;

/// One mixture component as delivered by a loader.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ComponentRecord {
    pub row: i32,
    pub column: i32,
    pub weight: f64,
    /// speed, direction
    pub mean: [f64; 2],
    /// row-major: cov00, cov01, cov10, cov11
    pub covariance: [f64; 4],
}

impl ComponentRecord {
    /// Columns run along x, rows along y.
    pub fn cell(&self) -> Cell {
        Cell::new(self.column, self.row)
    }

    pub fn mean(&self) -> Vector2<f64> {
        Vector2::from(self.mean)
    }

    pub fn covariance(&self) -> Matrix2<f64> {
        let [c00, c01, c10, c11] = self.covariance;
        Matrix2::new(c00, c01, c10, c11)
    }

    /// Returns a copy with `epsilon` added to both diagonal covariance entries.
    pub fn regularized(&self, epsilon: f64) -> Self {
        let mut record = *self;
        record.covariance[0] += epsilon;
        record.covariance[3] += epsilon;
        record
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PopulateSummary {
    pub inserted: usize,
    /// records addressing cells outside of the grid
    pub ignored: usize,
}

impl SpatialGrid {
    /// Adds all `records` to the grid, regularizing each covariance first.
    pub fn populate(
        &mut self,
        records: impl IntoIterator<Item = ComponentRecord>,
        regularization: f64,
    ) -> PopulateSummary {
        let mut summary = PopulateSummary::default();

        for record in records {
            let record = record.regularized(regularization);
            if self.add_component(
                record.cell(),
                record.weight,
                record.mean(),
                record.covariance(),
            ) {
                summary.inserted += 1;
            } else {
                summary.ignored += 1;
            }
        }

        if summary.ignored > 0 {
            tracing::warn!(
                inserted = summary.inserted,
                ignored = summary.ignored,
                "some components addressed cells outside of the grid"
            );
        } else {
            tracing::debug!(inserted = summary.inserted, "populated grid");
        }

        summary
    }
}
