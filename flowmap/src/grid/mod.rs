mod cell;
mod data;
mod map;

pub use cell::{GaussianComponent, MixtureCell};
pub use data::{Cell, GridData};
pub use map::{DirectionRay, SpatialGrid, OUT_OF_RANGE_DENSITY};
