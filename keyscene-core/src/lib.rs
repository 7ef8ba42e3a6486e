//! keyscene core library - transform and animation math for a retained-mode scene editor
//!
//! Provides vector/matrix algebra, a scene node hierarchy with world-matrix
//! propagation, orthographic/oblique/perspective cameras and a keyframe
//! animation engine. Rendering backends consume [`studio::Frame`]s.
//!
//! Conventions used everywhere: column vectors, row-major storage,
//! column-major export, `local = T · R · S`, `world = parent · local`,
//! `view_projection = projection · inverse(camera_world)`.

pub mod animation;
pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod scene;
pub mod studio;
pub mod transform;

// Re-export commonly used types
pub use animation::{AnimationClip, AnimationEngine, Easing, Keyframe, NodePose, PoseTarget};
pub use camera::{Camera, CameraParams, CameraRig, Projection, ProjectionKind};
pub use config::StudioConfig;
pub use error::{AlgebraError, AnimationError, ConfigError, SceneError, StudioError};
pub use geometry::{Geometry, GeometryParams, Triangle, Vertex};
pub use math::{Matrix3, Matrix4, SquareMatrix, Vector, Vector3, Vector4};
pub use scene::{DrawItem, Material, MaterialKind, Mesh, NodeId, NodeKind, SceneGraph, SceneNode, SerializedNode};
pub use studio::{Frame, Model, Studio};
pub use transform::Transform;
