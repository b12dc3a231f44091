use thiserror::Error;

use crate::grid::Cell;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: usize, height: usize },

    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f64),

    #[error("cell {0} is outside of the grid")]
    OutOfRange(Cell),
}
