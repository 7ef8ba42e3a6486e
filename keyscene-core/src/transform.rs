//! Local transform state of a scene node

use serde::{Deserialize, Serialize};

use crate::math::{Matrix4, SquareMatrix, Vector3};

/// Position, rotation (degrees per axis) and scale relative to the parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Transform {
    pub fn new(position: Vector3, rotation: Vector3, scale: Vector3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zero(), Vector3::zero(), Vector3::one())
    }

    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.rotation.x += dx;
        self.rotation.y += dy;
        self.rotation.z += dz;
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.position.x += dx;
        self.position.y += dy;
        self.position.z += dz;
    }

    /// `T · R · S`, scale applied first
    pub fn matrix(&self) -> Matrix4 {
        let Vector3 { x, y, z } = self.position;
        let r = self.rotation;
        let s = self.scale;
        Matrix4::identity()
            .translate(x, y, z)
            .multiply(&Matrix4::rotation(r.x, r.y, r.z))
            .scale(s.x, s.y, s.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_accumulates() {
        let mut t = Transform::identity();
        t.rotate(10.0, 20.0, 30.0);
        t.rotate(5.0, 0.0, -30.0);
        assert_eq!(t.rotation, Vector3::new(15.0, 20.0, 0.0));
    }

    #[test]
    fn test_identity_matrix() {
        let matrix = Transform::identity().matrix();
        assert!(matrix.approx_eq(&Matrix4::identity(), 1e-12));
    }

    #[test]
    fn test_scale_applies_before_translation() {
        let t = Transform::new(
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::zero(),
            Vector3::new(3.0, 1.0, 1.0),
        );
        let p = t.matrix().transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(p.truncate(), Vector3::new(13.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_applies_before_translation() {
        let t = Transform::new(
            Vector3::new(0.0, 5.0, 0.0),
            Vector3::new(0.0, 0.0, 90.0),
            Vector3::one(),
        );
        let p = t.matrix().transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert!(p.truncate().approx_eq(&Vector3::new(0.0, 6.0, 0.0), 1e-12));
    }
}
