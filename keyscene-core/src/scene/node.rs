//! Scene node payloads and handles

use std::fmt;

use crate::camera::Camera;
use crate::geometry::Geometry;
use crate::math::{Matrix4, SquareMatrix};
use crate::transform::Transform;

/// Stable handle into a [`SceneGraph`](super::SceneGraph).
///
/// The generation changes whenever a slot is reused, so a handle to a
/// despawned node never aliases its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Shading model of a mesh material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialKind {
    #[default]
    Basic,
    Phong,
    Reflective,
}

/// Material descriptor forwarded untouched to the rendering backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// Linear RGB in `[0, 1]`
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Basic,
            diffuse: [1.0, 0.0, 0.0],
            specular: [1.0, 0.0, 0.0],
            shininess: 32.0,
        }
    }
}

/// Drawable payload: geometry plus material
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self { geometry, material }
    }
}

/// What a node is, beyond its transform
#[derive(Debug, Clone)]
pub enum NodeKind {
    Node,
    Scene,
    Mesh(Mesh),
    Camera(Camera),
}

impl NodeKind {
    /// Tag used in the serialized `type` field
    pub fn type_tag(&self) -> &'static str {
        match self {
            NodeKind::Node => "node",
            NodeKind::Scene => "scene",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::Camera(_) => "camera",
        }
    }
}

/// One entity of the scene tree.
///
/// Transform fields may be mutated freely; cached matrices only reflect
/// them after [`SceneGraph::compute_world_matrix`](super::SceneGraph::compute_world_matrix).
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    pub(crate) local_matrix: Matrix4,
    pub(crate) world_matrix: Matrix4,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    pub fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::identity(),
            visible: true,
            local_matrix: Matrix4::identity(),
            world_matrix: Matrix4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Node)
    }

    pub fn scene(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Scene)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::with_kind(name, NodeKind::Mesh(mesh))
    }

    pub fn camera(name: impl Into<String>, camera: Camera) -> Self {
        Self::with_kind(name, NodeKind::Camera(camera))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn local_matrix(&self) -> &Matrix4 {
        &self.local_matrix
    }

    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world_matrix
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }
}
