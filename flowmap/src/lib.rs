//! A spatial grid of Gaussian mixture models over a two dimensional feature space (speed and
//! direction). Every grid cell holds its own mixture which can be queried by cell index or by world
//! position.

mod config;
mod error;
mod grid;
mod position;
mod record;

pub use config::GridConfig;
pub use error::GridError;
pub use grid::{
    Cell, DirectionRay, GaussianComponent, GridData, MixtureCell, SpatialGrid,
    OUT_OF_RANGE_DENSITY,
};
pub use position::PlanarPosition;
pub use record::{ComponentRecord, PopulateSummary, DEFAULT_REGULARIZATION};
