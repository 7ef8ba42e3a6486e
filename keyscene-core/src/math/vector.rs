//! Fixed-size vectors sharing the `Vector` trait

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use super::ZERO_TOLERANCE;
use crate::error::{AlgebraError, AlgebraResult};

/// Operations shared by every vector dimension
pub trait Vector: Copy + Sized {
    /// Number of components
    const DIM: usize;

    fn add(&self, other: &Self) -> Self;
    fn subtract(&self, other: &Self) -> Self;
    fn multiply(&self, scalar: f64) -> Self;
    fn dot(&self, other: &Self) -> f64;

    /// Component-wise linear blend, `t = 0` gives `self`
    fn lerp(&self, other: &Self, t: f64) -> Self;

    fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// Fails with [`AlgebraError::ZeroVector`] when the magnitude is below
    /// [`ZERO_TOLERANCE`].
    fn normalize(&self) -> AlgebraResult<Self> {
        let magnitude = self.magnitude();
        if magnitude < ZERO_TOLERANCE {
            return Err(AlgebraError::ZeroVector);
        }
        Ok(self.multiply(1.0 / magnitude))
    }
}

/// 3-component vector (positions, Euler angles in degrees, scale factors)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vector3Repr")]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 4-component (homogeneous) vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

// Input side accepts both `{x, y, z}` and `[x, y, z]`
#[derive(Deserialize)]
#[serde(untagged)]
enum Vector3Repr {
    Object { x: f64, y: f64, z: f64 },
    Array([f64; 3]),
}

impl From<Vector3Repr> for Vector3 {
    fn from(repr: Vector3Repr) -> Self {
        match repr {
            Vector3Repr::Object { x, y, z } => Self { x, y, z },
            Vector3Repr::Array([x, y, z]) => Self { x, y, z },
        }
    }
}

macro_rules! impl_vector {
    ($name:ident { $($field:ident),+ }, $dim:literal) => {
        impl $name {
            pub fn coords(&self) -> [f64; $dim] {
                [$(self.$field),+]
            }

            pub fn from_coords(coords: [f64; $dim]) -> Self {
                let [$($field),+] = coords;
                Self { $($field),+ }
            }

            /// Build from a runtime slice, failing when its length is not
            #[doc = concat!("exactly ", stringify!($dim), ".")]
            pub fn from_slice(values: &[f64]) -> AlgebraResult<Self> {
                let coords: [f64; $dim] =
                    values
                        .try_into()
                        .map_err(|_| AlgebraError::DimensionMismatch {
                            expected: $dim,
                            actual: values.len(),
                        })?;
                Ok(Self::from_coords(coords))
            }

            pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
                true $(&& (self.$field - other.$field).abs() <= tolerance)+
            }
        }

        impl Vector for $name {
            const DIM: usize = $dim;

            fn add(&self, other: &Self) -> Self {
                Self { $($field: self.$field + other.$field),+ }
            }

            fn subtract(&self, other: &Self) -> Self {
                Self { $($field: self.$field - other.$field),+ }
            }

            fn multiply(&self, scalar: f64) -> Self {
                Self { $($field: self.$field * scalar),+ }
            }

            fn dot(&self, other: &Self) -> f64 {
                0.0 $(+ self.$field * other.$field)+
            }

            fn lerp(&self, other: &Self, t: f64) -> Self {
                Self { $($field: self.$field + (other.$field - self.$field) * t),+ }
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Vector::add(&self, &rhs)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                self.subtract(&rhs)
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                self.multiply(rhs)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                self.multiply(-1.0)
            }
        }
    };
}

impl_vector!(Vector3 { x, y, z }, 3);
impl_vector!(Vector4 { x, y, z, w }, 4);

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Promote to homogeneous coordinates with the given `w`
    pub fn extend(&self, w: f64) -> Vector4 {
        Vector4::new(self.x, self.y, self.z, w)
    }
}

impl Vector4 {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Drop `w` without dividing
    pub fn truncate(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}
