/// Fixed-size square matrices sharing the `SquareMatrix` trait
///
/// Storage is row-major and matrices act on column vectors (`M · v`).
/// [`Matrix4::to_column_major`] produces the layout expected by GPU uniforms.
use std::ops::Mul;

use super::elimination;
use super::vector::{Vector3, Vector4};
use crate::error::{AlgebraError, AlgebraResult};

/// Operations shared by every matrix dimension
pub trait SquareMatrix: Copy + Sized {
    /// Number of rows (and columns)
    const DIM: usize;

    fn identity() -> Self;

    /// `self · other`
    fn multiply(&self, other: &Self) -> Self;

    fn transpose(&self) -> Self;

    /// Partial-pivot elimination; 0 for singular matrices
    fn determinant(&self) -> f64;

    /// Gauss-Jordan inverse, failing on singular input
    fn try_inverse(&self) -> AlgebraResult<Self>;

    /// `other · self`
    fn pre_multiply(&self, other: &Self) -> Self {
        other.multiply(self)
    }

    /// Inverse that never fails: singular input is logged and returned
    /// unchanged so callers keep a stale but finite matrix.
    fn inverse(&self) -> Self {
        match self.try_inverse() {
            Ok(inverse) => inverse,
            Err(err) => {
                log::error!("{err}; keeping the original matrix");
                *self
            }
        }
    }
}

/// 3x3 matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub rows: [[f64; 3]; 3],
}

/// 4x4 matrix for affine transforms and projections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub rows: [[f64; 4]; 4],
}

macro_rules! impl_square_matrix {
    ($name:ident, $row:ident, $dim:literal, $len:literal) => {
        impl $name {
            pub const fn from_rows(rows: [[f64; $dim]; $dim]) -> Self {
                Self { rows }
            }

            pub fn from_row_vectors(rows: [$row; $dim]) -> Self {
                Self {
                    rows: rows.map(|row| row.coords()),
                }
            }

            /// Build from runtime rows, rejecting ragged or wrongly sized input
            pub fn from_rows_slice<R: AsRef<[f64]>>(rows: &[R]) -> AlgebraResult<Self> {
                if rows.len() != $dim {
                    return Err(AlgebraError::DimensionMismatch {
                        expected: $dim,
                        actual: rows.len(),
                    });
                }
                let mut out = [[0.0; $dim]; $dim];
                for (dst, src) in out.iter_mut().zip(rows) {
                    *dst = $row::from_slice(src.as_ref())?.coords();
                }
                Ok(Self { rows: out })
            }

            pub fn row(&self, index: usize) -> $row {
                $row::from_coords(self.rows[index])
            }

            /// Row-major flattening
            pub fn flatten(&self) -> [f64; $len] {
                let mut out = [0.0; $len];
                for (i, value) in self.rows.iter().flatten().enumerate() {
                    out[i] = *value;
                }
                out
            }

            /// Transpose then flatten, narrowed to `f32` for GPU upload
            pub fn to_column_major(&self) -> [f32; $len] {
                self.transpose().flatten().map(|value| value as f32)
            }

            pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
                self.flatten()
                    .iter()
                    .zip(other.flatten().iter())
                    .all(|(a, b)| (a - b).abs() <= tolerance)
            }
        }

        impl SquareMatrix for $name {
            const DIM: usize = $dim;

            fn identity() -> Self {
                let mut rows = [[0.0; $dim]; $dim];
                for (i, row) in rows.iter_mut().enumerate() {
                    row[i] = 1.0;
                }
                Self { rows }
            }

            fn multiply(&self, other: &Self) -> Self {
                let mut rows = [[0.0; $dim]; $dim];
                for i in 0..$dim {
                    for j in 0..$dim {
                        rows[i][j] = (0..$dim).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
                    }
                }
                Self { rows }
            }

            fn transpose(&self) -> Self {
                let mut rows = [[0.0; $dim]; $dim];
                for i in 0..$dim {
                    for j in 0..$dim {
                        rows[j][i] = self.rows[i][j];
                    }
                }
                Self { rows }
            }

            fn determinant(&self) -> f64 {
                elimination::determinant(self.rows)
            }

            fn try_inverse(&self) -> AlgebraResult<Self> {
                elimination::inverse(self.rows)
                    .map(|rows| Self { rows })
                    .ok_or(AlgebraError::Singular)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as SquareMatrix>::identity()
            }
        }

        impl Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                self.multiply(&rhs)
            }
        }
    };
}

impl_square_matrix!(Matrix3, Vector3, 3, 9);
impl_square_matrix!(Matrix4, Vector4, 4, 16);

impl Matrix3 {
    pub fn transform(&self, v: &Vector3) -> Vector3 {
        let [x, y, z] = self.rows.map(|row| row[0] * v.x + row[1] * v.y + row[2] * v.z);
        Vector3::new(x, y, z)
    }
}

impl Matrix4 {
    pub fn transform(&self, v: &Vector4) -> Vector4 {
        let c = v.coords();
        let [x, y, z, w] = self
            .rows
            .map(|row| row.iter().zip(c.iter()).map(|(a, b)| a * b).sum::<f64>());
        Vector4::new(x, y, z, w)
    }

    /// Apply to a point (`w = 1`); the result is left homogeneous
    pub fn transform_point(&self, p: &Vector3) -> Vector4 {
        self.transform(&p.extend(1.0))
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Self {
        Self::from_rows([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Euler rotation in degrees, X applied first, then Y, then Z
    pub fn rotation(x: f64, y: f64, z: f64) -> Self {
        Self::identity().rotate(x, y, z)
    }

    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        self.multiply(&Self::translation(x, y, z))
    }

    pub fn scale(&self, x: f64, y: f64, z: f64) -> Self {
        self.multiply(&Self::scaling(x, y, z))
    }

    /// Pre-multiplies `Rz · (Ry · (Rx · self))`, angles in degrees
    pub fn rotate(&self, x: f64, y: f64, z: f64) -> Self {
        let (sx, cx) = x.to_radians().sin_cos();
        let (sy, cy) = y.to_radians().sin_cos();
        let (sz, cz) = z.to_radians().sin_cos();

        let rx = Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cx, -sx, 0.0],
            [0.0, sx, cx, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let ry = Self::from_rows([
            [cy, 0.0, sy, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-sy, 0.0, cy, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let rz = Self::from_rows([
            [cz, -sz, 0.0, 0.0],
            [sz, cz, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        rz.multiply(&ry.multiply(&rx.multiply(self)))
    }

    /// Right-handed orthographic projection into the [-1, 1] clip cube
    pub fn orthographic(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let fn_ = 1.0 / (far - near);
        Self::from_rows([
            [2.0 * rl, 0.0, 0.0, -(right + left) * rl],
            [0.0, 2.0 * tb, 0.0, -(top + bottom) * tb],
            [0.0, 0.0, -2.0 * fn_, -(far + near) * fn_],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Orthographic projection combined with a shear that slides depth onto
    /// the view plane along `angle` (degrees), scaled by `factor`.
    #[allow(clippy::too_many_arguments)]
    pub fn oblique(
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
        angle: f64,
        factor: f64,
    ) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        let shear = Self::from_rows([
            [1.0, 0.0, factor * cos, 0.0],
            [0.0, 1.0, factor * sin, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self::orthographic(left, right, bottom, top, near, far).multiply(&shear)
    }

    /// Right-handed perspective projection, `fov` is the vertical angle in degrees
    pub fn perspective(fov: f64, near: f64, aspect: f64, far: f64) -> Self {
        let f = (0.5 * std::f64::consts::PI * (1.0 - fov / 180.0)).tan();
        let range_inv = 1.0 / (near - far);
        Self::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (near + far) * range_inv, 2.0 * near * far * range_inv],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix4 as NaMatrix4;

    fn sample() -> Matrix4 {
        Matrix4::from_rows([
            [2.0, 0.0, 1.0, 3.0],
            [1.0, 3.0, 2.0, 0.0],
            [0.0, 1.0, 4.0, 1.0],
            [5.0, 2.0, 0.0, 1.0],
        ])
    }

    #[test]
    fn test_identity_multiply() {
        let m = sample();
        assert_eq!(m.multiply(&Matrix4::identity()), m);
        assert_eq!(Matrix4::identity().multiply(&m), m);
    }

    #[test]
    fn test_pre_multiply_reverses_operands() {
        let a = sample();
        let b = Matrix4::translation(1.0, 2.0, 3.0);
        assert_eq!(a.pre_multiply(&b), b.multiply(&a));
    }

    #[test]
    fn test_transpose_involution() {
        let m = sample().multiply(&Matrix4::rotation(12.0, 34.0, 56.0));
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn test_determinant_matches_nalgebra() {
        let m = sample();
        let reference = NaMatrix4::<f64>::from_row_slice(&m.flatten()).determinant();
        assert!((m.determinant() - reference).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = sample();
        let product = m.multiply(&m.inverse());
        assert!(product.approx_eq(&Matrix4::identity(), 1e-9));

        let m3 = Matrix3::from_rows([[3.0, 0.0, 2.0], [2.0, 0.0, -2.0], [0.0, 1.0, 1.0]]);
        assert!(m3.multiply(&m3.inverse()).approx_eq(&Matrix3::identity(), 1e-9));
    }

    #[test]
    fn test_inverse_matches_nalgebra() {
        let m = sample();
        let reference = NaMatrix4::<f64>::from_row_slice(&m.flatten())
            .try_inverse()
            .unwrap();
        let ours = NaMatrix4::<f64>::from_row_slice(&m.inverse().flatten());
        assert!((ours - reference).norm() < 1e-9);
    }

    #[test]
    fn test_singular_inverse_returns_original() {
        let singular = Matrix4::scaling(1.0, 0.0, 1.0);
        assert_eq!(singular.determinant(), 0.0);
        assert_eq!(singular.try_inverse(), Err(AlgebraError::Singular));
        assert_eq!(singular.inverse(), singular);
    }

    #[test]
    fn test_from_rows_slice_rejects_ragged() {
        let rows = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0, 1.0]];
        assert_eq!(
            Matrix3::from_rows_slice(&rows),
            Err(AlgebraError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        let ok = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        assert_eq!(Matrix3::from_rows_slice(&ok).unwrap(), Matrix3::identity());
    }

    #[test]
    fn test_column_major_export() {
        let m = Matrix4::translation(1.0, 2.0, 3.0);
        let flat = m.to_column_major();
        assert_eq!(&flat[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(flat[15], 1.0);
    }

    #[test]
    fn test_rotation_order_x_then_z() {
        // X by 90 sends +Y to +Z; Z by 90 leaves +Z alone
        let p = Matrix4::rotation(90.0, 0.0, 90.0).transform_point(&Vector3::new(0.0, 1.0, 0.0));
        assert!(p.truncate().approx_eq(&Vector3::new(0.0, 0.0, 1.0), 1e-12));

        // Z alone sends +X to +Y
        let q = Matrix4::rotation(0.0, 0.0, 90.0).transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert!(q.truncate().approx_eq(&Vector3::new(0.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_translate_and_scale_compose_on_the_right() {
        let m = Matrix4::identity().translate(5.0, 0.0, 0.0).scale(2.0, 2.0, 2.0);
        let p = m.transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(p, Vector4::new(7.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_orthographic_maps_center_to_center() {
        let (w, h, d) = (800.0, 600.0, 1000.0);
        let m = Matrix4::orthographic(-w / 2.0, w / 2.0, -h / 2.0, h / 2.0, -d / 2.0, d / 2.0);
        assert_eq!(m.transform_point(&Vector3::zero()), Vector4::new(0.0, 0.0, 0.0, 1.0));
        let corner = m.transform_point(&Vector3::new(w / 2.0, h / 2.0, 0.0));
        assert!(corner.approx_eq(&Vector4::new(1.0, 1.0, 0.0, 1.0), 1e-12));
    }

    #[test]
    fn test_oblique_without_shear_is_orthographic() {
        let ortho = Matrix4::orthographic(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let oblique = Matrix4::oblique(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 45.0, 0.0);
        assert!(ortho.approx_eq(&oblique, 1e-12));
    }

    #[test]
    fn test_perspective_near_plane_maps_to_minus_one() {
        let m = Matrix4::perspective(60.0, 1.0, 1.5, 100.0);
        let clip = m.transform_point(&Vector3::new(0.0, 0.0, -1.0));
        assert!((clip.z / clip.w + 1.0).abs() < 1e-12);
        let far = m.transform_point(&Vector3::new(0.0, 0.0, -100.0));
        assert!((far.z / far.w - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perspective_scale_is_cotangent_of_half_fov() {
        let m = Matrix4::perspective(90.0, 0.1, 1.0, 10.0);
        assert!((m.rows[1][1] - 1.0).abs() < 1e-12);
    }
}
