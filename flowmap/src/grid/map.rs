use nalgebra::{Matrix2, Vector2};

use super::{
    cell::MixtureCell,
    data::{Cell, GridData},
};
use crate::{error::GridError, position::PlanarPosition};

/// Density returned by [`SpatialGrid::probability_density`] for cells outside of the grid. A real
/// density is never negative.
pub const OUT_OF_RANGE_DENSITY: f64 = -1.0;

/// A ray pointing along one of the mean directions of a cell, starting in the cell center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionRay {
    pub origin: Vector2<f64>,
    /// unit vector
    pub direction: Vector2<f64>,
}

/// A fixed size grid of Gaussian mixture models laid out on the ground plane.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /** the position of the corner of cell (0, 0) in the world */
    origin: Vector2<f64>,

    /** edge length of a (square) cell in world units */
    cell_size: f64,

    cells: GridData<MixtureCell>,
}

impl SpatialGrid {
    /// Creates a grid of `width` x `height` empty cells.
    pub fn new(
        width: usize,
        height: usize,
        cell_size: f64,
        origin: Vector2<f64>,
    ) -> Result<Self, GridError> {
        // every cell has to be reachable through an i32 index
        let max = i32::MAX as usize;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(GridError::InvalidDimension { width, height });
        }

        // also rejects NaN
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        tracing::debug!(width, height, cell_size, %origin, "creating spatial grid");

        Ok(Self {
            origin,
            cell_size,
            cells: GridData::new_with(Vector2::new(width, height), MixtureCell::new),
        })
    }

    pub fn width(&self) -> usize {
        self.cells.size().x
    }

    pub fn height(&self) -> usize {
        self.cells.size().y
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn origin(&self) -> Vector2<f64> {
        self.origin
    }

    /// Converts a position in the world into the index of the cell containing it. Note that the
    /// returned cell is not guaranteed to lie _within_ the bounds of this grid.
    ///
    /// Non-finite positions always map to a cell outside of the grid.
    pub fn world_to_cell(&self, position: impl PlanarPosition) -> Cell {
        let grid = (position.planar() - self.origin) / self.cell_size;
        Cell::new(grid_index(grid.x), grid_index(grid.y))
    }

    /// World position of the corner of `cell` closest to the origin.
    pub fn cell_to_world(&self, cell: Cell) -> Vector2<f64> {
        self.origin + Vector2::new(cell.x as f64, cell.y as f64) * self.cell_size
    }

    pub fn cell_center(&self, cell: Cell) -> Vector2<f64> {
        self.cell_to_world(cell) + Vector2::repeat(self.cell_size / 2.0)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(cell)
    }

    pub fn cell(&self, cell: Cell) -> Option<&MixtureCell> {
        self.cells.get(cell)
    }

    /// All cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Cell, &MixtureCell)> {
        self.cells.iter_cells()
    }

    /// Total number of components over all cells.
    pub fn component_count(&self) -> usize {
        self.cells.values().map(MixtureCell::len).sum()
    }

    /// Number of components in every cell.
    pub fn component_counts(&self) -> GridData<usize> {
        self.cells.transform_map(MixtureCell::len)
    }

    /// Adds a component to the mixture of `cell`. Cells outside of the grid are silently ignored,
    /// the returned value tells whether the component was stored.
    pub fn add_component(
        &mut self,
        cell: Cell,
        weight: f64,
        mean: Vector2<f64>,
        covariance: Matrix2<f64>,
    ) -> bool {
        match self.cells.get_mut(cell) {
            Some(mixture) => {
                mixture.add_component(mean, covariance, weight);
                true
            }
            None => {
                tracing::trace!(%cell, "ignoring component outside of the grid");
                false
            }
        }
    }

    /// Like [`SpatialGrid::add_component`] but for the cell containing a world position.
    pub fn add_component_at(
        &mut self,
        position: impl PlanarPosition,
        weight: f64,
        mean: Vector2<f64>,
        covariance: Matrix2<f64>,
    ) -> bool {
        self.add_component(self.world_to_cell(position), weight, mean, covariance)
    }

    /// Adds a component, failing for cells outside of the grid instead of ignoring them.
    pub fn try_add_component(
        &mut self,
        cell: Cell,
        weight: f64,
        mean: Vector2<f64>,
        covariance: Matrix2<f64>,
    ) -> Result<(), GridError> {
        self.cells
            .get_mut(cell)
            .ok_or(GridError::OutOfRange(cell))?
            .add_component(mean, covariance, weight);
        Ok(())
    }

    /// Mixture density of `cell` at the feature vector `point`, or [`OUT_OF_RANGE_DENSITY`] if the
    /// cell is outside of the grid.
    pub fn probability_density(&self, cell: Cell, point: &Vector2<f64>) -> f64 {
        self.try_probability_density(cell, point)
            .unwrap_or(OUT_OF_RANGE_DENSITY)
    }

    pub fn probability_density_at(
        &self,
        position: impl PlanarPosition,
        point: &Vector2<f64>,
    ) -> f64 {
        self.probability_density(self.world_to_cell(position), point)
    }

    pub fn try_probability_density(
        &self,
        cell: Cell,
        point: &Vector2<f64>,
    ) -> Result<f64, GridError> {
        self.cells
            .get(cell)
            .map(|mixture| mixture.probability_density(point))
            .ok_or(GridError::OutOfRange(cell))
    }

    /// Mean directions of all components in `cell`, in insertion order.
    ///
    /// An empty cell gives an empty list, a cell outside of the grid gives
    /// [`GridError::OutOfRange`].
    pub fn mean_directions(&self, cell: Cell) -> Result<Vec<f64>, GridError> {
        self.cells
            .get(cell)
            .map(MixtureCell::mean_directions)
            .ok_or(GridError::OutOfRange(cell))
    }

    pub fn mean_directions_at(&self, position: impl PlanarPosition) -> Result<Vec<f64>, GridError> {
        self.mean_directions(self.world_to_cell(position))
    }

    /// One ray per mean direction of `cell`, starting in the center of the cell.
    pub fn direction_rays(&self, cell: Cell) -> Result<Vec<DirectionRay>, GridError> {
        let origin = self.cell_center(cell);

        Ok(self
            .mean_directions(cell)?
            .into_iter()
            .map(|angle| DirectionRay {
                origin,
                direction: Vector2::new(angle.cos(), angle.sin()),
            })
            .collect())
    }
}

/// Relative distance to an integer below which a grid coordinate is treated as lying exactly on a
/// cell border. Absorbs the rounding of `origin + x * cell_size`.
const BORDER_EPSILON: f64 = 1e-9;

fn grid_index(value: f64) -> i32 {
    if value.is_nan() {
        return i32::MIN;
    }

    let nearest = value.round();
    let index = if (value - nearest).abs() <= BORDER_EPSILON * nearest.abs().max(1.0) {
        nearest
    } else {
        value.floor()
    };

    // saturating, infinities end up at i32::MIN / i32::MAX which no grid contains
    index as i32
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::*;

    fn cov() -> Matrix2<f64> {
        Matrix2::new(1.1, 0.0, 0.0, 1.1)
    }

    fn small_grid() -> SpatialGrid {
        SpatialGrid::new(3, 2, 1.0, Vector2::zeros()).unwrap()
    }

    #[test]
    fn rejects_invalid_dimensions() {
        assert_eq!(
            SpatialGrid::new(0, 2, 1.0, Vector2::zeros()).unwrap_err(),
            GridError::InvalidDimension {
                width: 0,
                height: 2
            }
        );
        assert!(SpatialGrid::new(3, 0, 1.0, Vector2::zeros()).is_err());
        assert!(matches!(
            SpatialGrid::new(3, 2, 0.0, Vector2::zeros()),
            Err(GridError::InvalidCellSize(_))
        ));
        assert!(SpatialGrid::new(3, 2, -1.0, Vector2::zeros()).is_err());
        assert!(SpatialGrid::new(3, 2, f64::NAN, Vector2::zeros()).is_err());
    }

    #[test]
    fn fully_populated_with_empty_cells() {
        let grid = small_grid();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.iter_cells().count(), 6);
        assert!(grid.iter_cells().all(|(_, c)| c.is_empty()));
        assert_eq!(grid.component_count(), 0);
    }

    #[test]
    fn scenario() {
        let mut grid = small_grid();

        assert!(grid.add_component(Cell::new(1, 1), 5.0, Vector2::new(10.0, 20.0), cov()));

        assert_eq!(grid.mean_directions(Cell::new(1, 1)), Ok(vec![20.0]));
        assert_eq!(grid.mean_directions(Cell::new(0, 0)), Ok(vec![]));
        assert_eq!(
            grid.probability_density(Cell::new(5, 5), &Vector2::new(1.0, 2.0)),
            OUT_OF_RANGE_DENSITY
        );
    }

    #[test]
    fn out_of_range_is_reported() {
        let mut grid = small_grid();
        let point = Vector2::new(0.0, 0.0);

        for cell in [
            Cell::new(-1, 0),
            Cell::new(0, -1),
            Cell::new(3, 0),
            Cell::new(0, 2),
            Cell::new(i32::MAX, i32::MIN),
        ] {
            assert!(!grid.add_component(cell, 1.0, point, cov()));
            assert_eq!(
                grid.try_add_component(cell, 1.0, point, cov()),
                Err(GridError::OutOfRange(cell))
            );
            assert_eq!(grid.probability_density(cell, &point), -1.0);
            assert_eq!(
                grid.try_probability_density(cell, &point),
                Err(GridError::OutOfRange(cell))
            );
            assert_eq!(grid.mean_directions(cell), Err(GridError::OutOfRange(cell)));
            assert!(grid.direction_rays(cell).is_err());
            assert!(grid.cell(cell).is_none());
        }

        // nothing was stored anywhere
        assert_eq!(grid.component_count(), 0);
    }

    #[test]
    fn empty_cell_density_is_zero() {
        let grid = small_grid();

        for (cell, _) in grid.iter_cells() {
            assert_eq!(grid.probability_density(cell, &Vector2::new(4.0, -2.0)), 0.0);
        }
    }

    #[test]
    fn density_is_non_negative() {
        let mut grid = small_grid();
        grid.add_component(Cell::new(2, 0), 0.7, Vector2::new(1.0, 0.5), cov());
        grid.add_component(Cell::new(2, 0), 1.3, Vector2::new(0.2, 3.0), cov());

        for (cell, _) in grid.iter_cells() {
            for p in [Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.5), Vector2::new(50.0, -9.0)] {
                assert!(grid.probability_density(cell, &p) >= 0.0);
            }
        }
    }

    #[test]
    fn single_component_round_trip() {
        let mut grid = small_grid();
        let mean = Vector2::new(2.0, 1.0);
        grid.add_component(Cell::new(0, 1), 3.0, mean, cov());

        let expected = 3.0 / (2.0 * std::f64::consts::PI * cov().determinant().sqrt());
        assert_relative_eq!(
            grid.try_probability_density(Cell::new(0, 1), &mean).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn directions_in_insertion_order() {
        let mut grid = small_grid();
        let cell = Cell::new(2, 1);
        let directions = [0.1, 2.0, -1.5, 0.1];

        for (i, &d) in directions.iter().enumerate() {
            grid.add_component(cell, 1.0, Vector2::new(i as f64, d), cov());
        }

        assert_eq!(grid.mean_directions(cell), Ok(directions.to_vec()));
        assert_eq!(grid.cell(cell).map(MixtureCell::len), Some(4));
        assert_eq!(*grid.component_counts().get(cell).unwrap(), 4);
        assert_eq!(grid.component_count(), 4);
    }

    #[test]
    fn world_to_cell_inverts_cell_to_world() {
        let grid = SpatialGrid::new(60, 36, 0.5, Vector2::new(-50.0, -12.0)).unwrap();

        for y in 0..36 {
            for x in 0..60 {
                let cell = Cell::new(x, y);
                let corner = grid.cell_to_world(cell);

                assert_eq!(grid.world_to_cell(corner), cell);
                for offset in [0.0, 0.01, 0.25, 0.49] {
                    assert_eq!(grid.world_to_cell(corner + Vector2::new(offset, offset)), cell);
                }
                assert_eq!(grid.world_to_cell(grid.cell_center(cell)), cell);
            }
        }
    }

    #[test]
    fn corners_round_trip_for_inexact_cell_sizes() {
        for cell_size in [0.1, 0.3, 0.7, 1.3] {
            let grid = SpatialGrid::new(60, 36, cell_size, Vector2::new(-50.0, -12.0)).unwrap();

            for y in 0..36 {
                for x in 0..60 {
                    let cell = Cell::new(x, y);
                    let corner = grid.cell_to_world(cell);

                    assert_eq!(grid.world_to_cell(corner), cell, "cell size {cell_size}");
                    for fraction in [0.01, 0.5, 0.99] {
                        let inside = corner + Vector2::repeat(fraction * cell_size);
                        assert_eq!(grid.world_to_cell(inside), cell, "cell size {cell_size}");
                    }
                }
            }
        }
    }

    #[test]
    fn non_finite_positions_are_out_of_range() {
        let mut grid = small_grid();
        let mean = Vector2::new(1.0, 7.0);

        for position in [
            Vector2::new(f64::NAN, f64::NAN),
            Vector2::new(f64::NAN, 0.5),
            Vector2::new(0.5, f64::NAN),
            Vector2::new(f64::INFINITY, 0.5),
            Vector2::new(0.5, f64::NEG_INFINITY),
            Vector2::new(f64::NEG_INFINITY, f64::INFINITY),
        ] {
            assert!(!grid.contains(grid.world_to_cell(position)));
            assert!(!grid.add_component_at(position, 1.0, mean, cov()));
            assert_eq!(grid.probability_density_at(position, &mean), OUT_OF_RANGE_DENSITY);
            assert!(matches!(
                grid.mean_directions_at(position),
                Err(GridError::OutOfRange(_))
            ));
        }

        assert_eq!(grid.component_count(), 0);
        assert_eq!(grid.mean_directions(Cell::new(0, 0)), Ok(vec![]));
    }

    #[test]
    fn rejects_dimensions_beyond_index_range() {
        let too_wide = i32::MAX as usize + 1;

        assert_eq!(
            SpatialGrid::new(too_wide, 1, 1.0, Vector2::zeros()).unwrap_err(),
            GridError::InvalidDimension {
                width: too_wide,
                height: 1
            }
        );
        assert!(SpatialGrid::new(1, too_wide, 1.0, Vector2::zeros()).is_err());
    }

    #[test]
    fn world_to_cell_floors_negative_positions() {
        let grid = small_grid();

        assert_eq!(grid.world_to_cell(Vector2::new(-0.5, 0.5)), Cell::new(-1, 0));
        assert_eq!(grid.world_to_cell(Vector2::new(0.5, -2.5)), Cell::new(0, -3));
        assert_eq!(grid.world_to_cell((3.0, 1.999)), Cell::new(3, 1));
    }

    #[test]
    fn vertical_axis_is_ignored() {
        let mut grid = small_grid();

        assert!(grid.add_component_at(
            Vector3::new(1.5, 1.5, 100.0),
            1.0,
            Vector2::new(0.0, 0.75),
            cov()
        ));
        assert_eq!(
            grid.mean_directions_at(Vector3::new(1.2, 1.8, -40.0)),
            Ok(vec![0.75])
        );
        assert_eq!(grid.mean_directions(Cell::new(1, 1)), Ok(vec![0.75]));
    }

    #[test]
    fn positional_queries_match_indexed_ones() {
        let mut grid = SpatialGrid::new(4, 4, 2.0, Vector2::new(-4.0, -4.0)).unwrap();
        let mean = Vector2::new(1.0, 1.0);
        grid.add_component_at(Vector2::new(-3.0, 1.0), 2.0, mean, cov());

        let cell = Cell::new(0, 2);
        assert_eq!(
            grid.probability_density_at(Vector2::new(-3.9, 0.1), &mean),
            grid.probability_density(cell, &mean)
        );
        assert!(grid.probability_density(cell, &mean) > 0.0);

        assert!(!grid.add_component_at(Vector2::new(10.0, 0.0), 2.0, mean, cov()));
        assert_eq!(
            grid.probability_density_at(Vector2::new(10.0, 0.0), &mean),
            OUT_OF_RANGE_DENSITY
        );
        assert!(grid.mean_directions_at(Vector2::new(-4.1, 0.0)).is_err());
    }

    #[test]
    fn rays_start_in_cell_center() {
        let mut grid = SpatialGrid::new(2, 2, 2.0, Vector2::new(1.0, 1.0)).unwrap();
        let cell = Cell::new(1, 0);
        grid.add_component(cell, 1.0, Vector2::new(1.0, 0.0), cov());
        grid.add_component(cell, 1.0, Vector2::new(1.0, std::f64::consts::FRAC_PI_2), cov());

        let rays = grid.direction_rays(cell).unwrap();
        assert_eq!(rays.len(), 2);

        for ray in &rays {
            assert_relative_eq!(ray.origin, Vector2::new(4.0, 2.0));
            assert_relative_eq!(ray.direction.norm(), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(rays[0].direction, Vector2::new(1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(rays[1].direction, Vector2::new(0.0, 1.0), epsilon = 1e-12);

        assert!(grid.direction_rays(Cell::new(0, 0)).unwrap().is_empty());
    }
}
