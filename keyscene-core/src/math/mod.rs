//! Linear algebra: fixed-size vectors and square matrices

mod elimination;
pub mod matrix;
pub mod vector;

pub use matrix::{Matrix3, Matrix4, SquareMatrix};
pub use vector::{Vector, Vector3, Vector4};

/// Magnitude below which a vector cannot be normalized
pub const ZERO_TOLERANCE: f64 = 1e-10;

/// Pivot magnitude below which a matrix is treated as singular
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Wrap an angle in degrees into `[0, 360)`
pub fn wrap_angle(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}
