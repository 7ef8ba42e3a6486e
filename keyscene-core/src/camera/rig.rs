use super::{Camera, Projection, ProjectionKind};
use crate::config::{CameraConfig, ViewportConfig};
use crate::error::SceneResult;
use crate::math::{wrap_angle, Matrix4, Vector3};
use crate::scene::{NodeId, SceneGraph, SceneNode};
use crate::transform::Transform;

/// Orbit centre with one camera per projection kind attached to it.
///
/// Rotating or moving the centre carries every camera along; only the
/// active one is used for rendering.
#[derive(Debug, Clone)]
pub struct CameraRig {
    graph: SceneGraph,
    orthographic: NodeId,
    oblique: NodeId,
    perspective: NodeId,
    active: ProjectionKind,
}

impl CameraRig {
    pub fn new(viewport: &ViewportConfig, config: &CameraConfig) -> Self {
        let (half_w, half_h) = (viewport.width / 2.0, viewport.height / 2.0);
        let half_d = config.depth / 2.0;

        let mut graph = SceneGraph::with_root(SceneNode::new("Camera"));
        let root = graph.root();

        let orthographic = graph.spawn(SceneNode::camera(
            "orthographic camera",
            Camera::orthographic(-half_w, half_w, -half_h, half_h, -half_d, half_d),
        ));
        let oblique = graph.spawn(SceneNode::camera(
            "oblique camera",
            Camera::oblique(
                -half_w,
                half_w,
                -half_h,
                half_h,
                -half_d,
                half_d,
                config.oblique.angle,
                config.oblique.factor,
            ),
        ));
        let perspective = graph.spawn(
            SceneNode::camera(
                "perspective camera",
                Camera::perspective(
                    config.perspective.fov,
                    config.perspective.near,
                    viewport.aspect(),
                    config.perspective.far,
                ),
            )
            .with_transform(Transform::from_position(Vector3::new(
                0.0,
                0.0,
                Camera::perspective_distance(1.0),
            ))),
        );

        for id in [orthographic, oblique, perspective] {
            if let Err(err) = graph.add(root, id) {
                log::error!("failed to attach camera {id}: {err}");
            }
        }

        log::debug!(
            "camera rig {}x{} depth {} active {}",
            viewport.width,
            viewport.height,
            config.depth,
            config.projection
        );

        Self {
            graph,
            orthographic,
            oblique,
            perspective,
            active: config.projection,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn camera_id(&self, kind: ProjectionKind) -> NodeId {
        match kind {
            ProjectionKind::Orthographic => self.orthographic,
            ProjectionKind::Oblique => self.oblique,
            ProjectionKind::Perspective => self.perspective,
        }
    }

    pub fn active_kind(&self) -> ProjectionKind {
        self.active
    }

    pub fn active_id(&self) -> NodeId {
        self.camera_id(self.active)
    }

    pub fn active_camera(&self) -> SceneResult<&Camera> {
        self.graph.camera(self.active_id())
    }

    pub fn set_projection(&mut self, kind: ProjectionKind) {
        if self.active != kind {
            log::debug!("projection {} -> {}", self.active, kind);
            self.active = kind;
        }
    }

    /// Centre node the cameras orbit around
    pub fn center(&self) -> SceneResult<&Transform> {
        Ok(&self.graph.get(self.graph.root())?.transform)
    }

    /// Set the active camera's zoom and rebuild its projection.
    ///
    /// The perspective camera dollies along its local Z axis instead of
    /// shrinking the frustum.
    pub fn zoom(&mut self, value: f64) -> SceneResult<f64> {
        let id = self.active_id();
        let camera = self.graph.camera_mut(id)?;
        let zoom = camera.set_zoom(value);
        camera.compute_projection_matrix();

        if self.active == ProjectionKind::Perspective {
            self.graph.get_mut(id)?.transform.position.z = Camera::perspective_distance(zoom);
            self.graph.compute_world_matrix(id, false, true)?;
        }
        Ok(zoom)
    }

    pub fn zoom_by(&mut self, delta: f64) -> SceneResult<f64> {
        let current = self.active_camera()?.zoom();
        self.zoom(current + delta)
    }

    /// Drag-style orbit; screen deltas map onto the centre's X/Y rotation
    pub fn orbit(&mut self, dx: f64, dy: f64) -> SceneResult<()> {
        let rotation = self.center()?.rotation;
        self.set_orbit_rotation(Vector3::new(rotation.x - dy, rotation.y - dx, 0.0))
    }

    pub fn set_orbit_rotation(&mut self, rotation: Vector3) -> SceneResult<()> {
        let root = self.graph.root();
        self.graph.get_mut(root)?.transform.rotation = Vector3::new(
            wrap_angle(rotation.x),
            wrap_angle(rotation.y),
            wrap_angle(rotation.z),
        );
        self.graph.compute_world_matrix(root, false, true)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> SceneResult<()> {
        let root = self.graph.root();
        let center = &mut self.graph.get_mut(root)?.transform;
        center.position.x -= dx;
        center.position.y += dy;
        self.graph.compute_world_matrix(root, false, true)
    }

    /// Move the orbit centre onto `target`
    pub fn set_target(&mut self, target: Vector3) -> SceneResult<()> {
        let root = self.graph.root();
        self.graph.get_mut(root)?.transform.position = target;
        self.graph.compute_world_matrix(root, false, true)
    }

    /// Centre back at the origin, no rotation, every camera at zoom 1
    pub fn reset(&mut self) -> SceneResult<()> {
        let root = self.graph.root();
        self.graph.get_mut(root)?.transform = Transform::identity();

        for kind in ProjectionKind::ALL {
            let id = self.camera_id(kind);
            let camera = self.graph.camera_mut(id)?;
            camera.set_zoom(1.0);
            camera.compute_projection_matrix();
        }
        self.graph.get_mut(self.perspective)?.transform.position.z =
            Camera::perspective_distance(1.0);

        self.graph.compute_world_matrix(root, false, true)
    }

    /// Refit every frustum to a new viewport size
    pub fn resize(&mut self, width: f64, height: f64) -> SceneResult<()> {
        let (half_w, half_h) = (width / 2.0, height / 2.0);
        let aspect = if height > 0.0 { width / height } else { 1.0 };

        for kind in ProjectionKind::ALL {
            let camera = self.graph.camera_mut(self.camera_id(kind))?;
            match camera.projection_mut() {
                Projection::Orthographic {
                    left,
                    right,
                    bottom,
                    top,
                    ..
                }
                | Projection::Oblique {
                    left,
                    right,
                    bottom,
                    top,
                    ..
                } => {
                    *left = -half_w;
                    *right = half_w;
                    *bottom = -half_h;
                    *top = half_h;
                }
                Projection::Perspective { aspect: a, .. } => *a = aspect,
            }
            camera.compute_projection_matrix();
        }
        log::debug!("camera rig resized to {width}x{height}");
        Ok(())
    }

    /// View-projection of the active camera
    pub fn view_projection(&mut self) -> SceneResult<Matrix4> {
        let id = self.active_id();
        self.graph.view_projection_matrix(id)
    }
}
