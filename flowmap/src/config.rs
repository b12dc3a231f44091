use std::{fs, path::Path};

use anyhow::anyhow;
use nalgebra::Vector2;
use serde::Deserialize;

use crate::{
    error::GridError,
    grid::SpatialGrid,
    record::{ComponentRecord, PopulateSummary, DEFAULT_REGULARIZATION},
};

/// Layout of a [`SpatialGrid`] and the regularization applied to loaded components.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub cell_size: f64,
    pub origin: [f64; 2],

    #[serde(default = "default_regularization")]
    pub regularization: f64,
}

fn default_regularization() -> f64 {
    DEFAULT_REGULARIZATION
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 36,
            cell_size: 1.0,
            origin: [-50.0, -12.0],
            regularization: DEFAULT_REGULARIZATION,
        }
    }
}

impl GridConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        // read file contents
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| anyhow!(e))
    }

    pub fn origin(&self) -> Vector2<f64> {
        Vector2::from(self.origin)
    }

    /// Creates an empty grid with this layout.
    pub fn build(&self) -> Result<SpatialGrid, GridError> {
        SpatialGrid::new(self.width, self.height, self.cell_size, self.origin())
    }

    /// Adds `records` to `grid` using the configured regularization.
    pub fn populate(
        &self,
        grid: &mut SpatialGrid,
        records: impl IntoIterator<Item = ComponentRecord>,
    ) -> PopulateSummary {
        grid.populate(records, self.regularization)
    }
}
