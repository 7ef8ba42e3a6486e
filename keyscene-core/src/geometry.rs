/// Geometry descriptors for mesh nodes and their triangle expansion
use serde::{Deserialize, Serialize};

use crate::math::{Vector, Vector3};

/// A vertex with position and normal in the mesh's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3,
    pub normal: Vector3,
}

impl Vertex {
    pub fn new(position: Vector3, normal: Vector3) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order; `None` for degenerate faces
    pub fn calculate_normal(&self) -> Option<Vector3> {
        let v0 = self.vertices[0].position;
        let edge1 = self.vertices[1].position - v0;
        let edge2 = self.vertices[2].position - v0;
        edge1.cross(&edge2).normalize().ok()
    }
}

/// Serialized geometry parameters, shared by every shape
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryParams {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub depth: f64,
}

/// Shape owned by a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box { width: f64, height: f64, depth: f64 },
    Plane { width: f64, height: f64 },
}

impl Geometry {
    pub fn cube(size: f64) -> Self {
        Self::Box {
            width: size,
            height: size,
            depth: size,
        }
    }

    pub fn params(&self) -> GeometryParams {
        match *self {
            Geometry::Box {
                width,
                height,
                depth,
            } => GeometryParams {
                width,
                height,
                depth,
            },
            Geometry::Plane { width, height } => GeometryParams {
                width,
                height,
                depth: 0.0,
            },
        }
    }

    /// Zero depth reads back as a plane, anything else as a box.
    ///
    /// A `Box` with zero depth therefore comes back as the `Plane` of the
    /// same width and height, which covers the same area.
    pub fn from_params(params: GeometryParams) -> Self {
        if params.depth == 0.0 {
            Geometry::Plane {
                width: params.width,
                height: params.height,
            }
        } else {
            Geometry::Box {
                width: params.width,
                height: params.height,
                depth: params.depth,
            }
        }
    }

    /// Expand into triangles centred on the origin
    pub fn triangles(&self) -> Vec<Triangle> {
        match *self {
            Geometry::Box {
                width,
                height,
                depth,
            } => box_triangles(width / 2.0, height / 2.0, depth / 2.0),
            Geometry::Plane { width, height } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                let n = Vector3::new(0.0, 0.0, 1.0);
                quad(
                    [
                        Vector3::new(-hw, -hh, 0.0),
                        Vector3::new(hw, -hh, 0.0),
                        Vector3::new(hw, hh, 0.0),
                        Vector3::new(-hw, hh, 0.0),
                    ],
                    n,
                )
                .to_vec()
            }
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::cube(200.0)
    }
}

/// Two counter-clockwise triangles covering a quad
fn quad(corners: [Vector3; 4], normal: Vector3) -> [Triangle; 2] {
    let v = corners.map(|p| Vertex::new(p, normal));
    [Triangle::new(v[0], v[1], v[2]), Triangle::new(v[0], v[2], v[3])]
}

fn box_triangles(hw: f64, hh: f64, hd: f64) -> Vec<Triangle> {
    let p = Vector3::new;
    let faces = [
        // Front
        (
            [p(-hw, -hh, hd), p(hw, -hh, hd), p(hw, hh, hd), p(-hw, hh, hd)],
            p(0.0, 0.0, 1.0),
        ),
        // Back
        (
            [p(hw, -hh, -hd), p(-hw, -hh, -hd), p(-hw, hh, -hd), p(hw, hh, -hd)],
            p(0.0, 0.0, -1.0),
        ),
        // Top
        (
            [p(-hw, hh, hd), p(hw, hh, hd), p(hw, hh, -hd), p(-hw, hh, -hd)],
            p(0.0, 1.0, 0.0),
        ),
        // Bottom
        (
            [p(-hw, -hh, -hd), p(hw, -hh, -hd), p(hw, -hh, hd), p(-hw, -hh, hd)],
            p(0.0, -1.0, 0.0),
        ),
        // Right
        (
            [p(hw, -hh, hd), p(hw, -hh, -hd), p(hw, hh, -hd), p(hw, hh, hd)],
            p(1.0, 0.0, 0.0),
        ),
        // Left
        (
            [p(-hw, -hh, -hd), p(-hw, -hh, hd), p(-hw, hh, hd), p(-hw, hh, -hd)],
            p(-1.0, 0.0, 0.0),
        ),
    ];

    faces
        .into_iter()
        .flat_map(|(corners, normal)| quad(corners, normal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_has_twelve_triangles() {
        assert_eq!(Geometry::cube(2.0).triangles().len(), 12);
        assert_eq!(
            Geometry::Plane {
                width: 1.0,
                height: 1.0
            }
            .triangles()
            .len(),
            2
        );
    }

    #[test]
    fn test_winding_matches_normals() {
        let shape = Geometry::Box {
            width: 2.0,
            height: 4.0,
            depth: 6.0,
        };
        for triangle in shape.triangles() {
            let computed = triangle.calculate_normal().unwrap();
            assert!(computed.approx_eq(&triangle.vertices[0].normal, 1e-12));
        }
    }

    #[test]
    fn test_params_round_trip() {
        let shapes = [
            Geometry::Box {
                width: 1.0,
                height: 2.0,
                depth: 3.0,
            },
            Geometry::Plane {
                width: 7.0,
                height: 7.0,
            },
        ];
        for shape in shapes {
            assert_eq!(Geometry::from_params(shape.params()), shape);
        }
    }

    #[test]
    fn test_zero_depth_box_reads_back_as_plane() {
        let flat = Geometry::Box {
            width: 4.0,
            height: 2.0,
            depth: 0.0,
        };
        let restored = Geometry::from_params(flat.params());
        assert_eq!(
            restored,
            Geometry::Plane {
                width: 4.0,
                height: 2.0
            }
        );
        assert_eq!(restored.params(), flat.params());
    }
}
