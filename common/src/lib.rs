pub mod gaussian;
pub mod math;
