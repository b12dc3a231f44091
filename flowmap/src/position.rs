use nalgebra::{Point2, Point3, Vector2, Vector3};

/// A world position that can be projected onto the horizontal plane of the grid.
///
/// Three dimensional positions drop their vertical axis (z), the grid only covers the ground plane.
pub trait PlanarPosition {
    fn planar(&self) -> Vector2<f64>;
}

impl PlanarPosition for Vector2<f64> {
    fn planar(&self) -> Vector2<f64> {
        *self
    }
}

impl PlanarPosition for Point2<f64> {
    fn planar(&self) -> Vector2<f64> {
        self.coords
    }
}

impl PlanarPosition for Vector3<f64> {
    fn planar(&self) -> Vector2<f64> {
        self.xy()
    }
}

impl PlanarPosition for Point3<f64> {
    fn planar(&self) -> Vector2<f64> {
        self.coords.xy()
    }
}

impl PlanarPosition for (f64, f64) {
    fn planar(&self) -> Vector2<f64> {
        Vector2::new(self.0, self.1)
    }
}
