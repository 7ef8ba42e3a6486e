//! Cameras and projection utilities
//!
//! A camera is a scene node whose payload holds a projection. Changing any
//! projection parameter leaves the cached matrix stale until
//! [`Camera::compute_projection_matrix`] is called.

mod rig;

pub use rig::CameraRig;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, SceneError, SceneResult};
use crate::math::{Matrix4, SquareMatrix};
use crate::scene::{NodeId, SceneGraph};

/// Smallest and largest accepted zoom factors
pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 5.0;

/// Camera distance of a perspective camera at zoom 1
pub const PERSPECTIVE_BASE_DISTANCE: f64 = 400.0;
/// Distance travelled per unit of perspective zoom
pub const PERSPECTIVE_ZOOM_STEP: f64 = 75.0;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    #[default]
    Orthographic,
    Oblique,
    Perspective,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 3] = [
        ProjectionKind::Orthographic,
        ProjectionKind::Oblique,
        ProjectionKind::Perspective,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::Orthographic => "orthographic",
            ProjectionKind::Oblique => "oblique",
            ProjectionKind::Perspective => "perspective",
        }
    }

    /// Next mode in cycling order
    pub fn next(&self) -> Self {
        match self {
            ProjectionKind::Orthographic => ProjectionKind::Oblique,
            ProjectionKind::Oblique => ProjectionKind::Perspective,
            ProjectionKind::Perspective => ProjectionKind::Orthographic,
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "projection".to_string(),
                value: s.to_string(),
            })
    }
}

/// Frustum parameters of each projection variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Projection {
    Orthographic {
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
    },
    Oblique {
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
        /// Shear direction in degrees
        angle: f64,
        /// Depth-to-plane shear ratio (0.5 gives a cabinet projection)
        factor: f64,
    },
    Perspective {
        /// Vertical field of view in degrees
        fov: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
}

impl Projection {
    pub fn kind(&self) -> ProjectionKind {
        match self {
            Projection::Orthographic { .. } => ProjectionKind::Orthographic,
            Projection::Oblique { .. } => ProjectionKind::Oblique,
            Projection::Perspective { .. } => ProjectionKind::Perspective,
        }
    }

    /// Projection matrix with parallel extents divided by `zoom`
    pub fn matrix(&self, zoom: f64) -> Matrix4 {
        match *self {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Matrix4::orthographic(left / zoom, right / zoom, bottom / zoom, top / zoom, near, far),
            Projection::Oblique {
                left,
                right,
                bottom,
                top,
                near,
                far,
                angle,
                factor,
            } => Matrix4::oblique(
                left / zoom,
                right / zoom,
                bottom / zoom,
                top / zoom,
                near,
                far,
                angle,
                factor,
            ),
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Matrix4::perspective(fov, near, aspect, far),
        }
    }
}

/// Serialized camera settings; cached matrices are rebuilt on import
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub projection: Projection,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

/// Camera payload of a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    projection: Projection,
    projection_matrix: Matrix4,
    inverse_world_matrix: Matrix4,
    zoom: f64,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            projection_matrix: Matrix4::identity(),
            inverse_world_matrix: Matrix4::identity(),
            zoom: 1.0,
        };
        camera.compute_projection_matrix();
        camera
    }

    pub fn orthographic(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        })
    }

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
        Self::new(Projection::Oblique {
            left,
            right,
            bottom,
            top,
            near,
            far,
            angle,
            factor,
        })
    }

    pub fn perspective(fov: f64, near: f64, aspect: f64, far: f64) -> Self {
        Self::new(Projection::Perspective {
            fov,
            aspect,
            near,
            far,
        })
    }

    pub fn kind(&self) -> ProjectionKind {
        self.projection.kind()
    }

    pub fn params(&self) -> CameraParams {
        CameraParams {
            projection: self.projection,
            zoom: self.zoom,
        }
    }

    pub fn from_params(params: CameraParams) -> Self {
        let mut camera = Self::new(params.projection);
        camera.set_zoom(params.zoom);
        camera.compute_projection_matrix();
        camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Mutable frustum parameters; call [`Self::compute_projection_matrix`] afterwards
    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Store a zoom factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`; the projection
    /// matrix is not recomputed.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if clamped != zoom {
            log::debug!("zoom {zoom} clamped to {clamped}");
        }
        self.zoom = clamped;
        clamped
    }

    pub fn compute_projection_matrix(&mut self) {
        self.projection_matrix = self.projection.matrix(self.zoom);
    }

    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection_matrix
    }

    /// Inverse world matrix cached by the last view-projection computation
    pub fn inverse_world_matrix(&self) -> &Matrix4 {
        &self.inverse_world_matrix
    }

    /// Eye distance a perspective camera keeps from its orbit centre
    pub fn perspective_distance(zoom: f64) -> f64 {
        PERSPECTIVE_BASE_DISTANCE - (zoom - 1.0) * PERSPECTIVE_ZOOM_STEP
    }
}

impl SceneGraph {
    pub fn camera(&self, id: NodeId) -> SceneResult<&Camera> {
        let node = self.get(id)?;
        node.as_camera()
            .ok_or_else(|| SceneError::NotACamera(node.name.clone()))
    }

    pub fn camera_mut(&mut self, id: NodeId) -> SceneResult<&mut Camera> {
        let node = self.get_mut(id)?;
        let name = node.name.clone();
        node.as_camera_mut().ok_or(SceneError::NotACamera(name))
    }

    /// Refresh the camera's world matrix (ancestors included), invert it and
    /// return `projection · inverse_world`.
    ///
    /// A singular world matrix keeps the previous world matrix as the inverse
    /// (see [`SquareMatrix::inverse`]).
    pub fn view_projection_matrix(&mut self, id: NodeId) -> SceneResult<Matrix4> {
        self.camera(id)?;
        self.compute_world_matrix(id, true, false)?;
        let inverse_world = self.get(id)?.world_matrix().inverse();

        let camera = self.camera_mut(id)?;
        camera.inverse_world_matrix = inverse_world;
        Ok(camera.projection_matrix.multiply(&inverse_world))
    }
}
