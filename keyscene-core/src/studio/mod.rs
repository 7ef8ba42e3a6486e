//! Editor facade tying the model library, camera rig and animation engine
//! together.
//!
//! A [`Studio`] is constructed explicitly and driven by whoever owns the
//! frame loop: call [`Studio::update`] with the elapsed time, then hand
//! [`Studio::frame`] to a rendering backend.

mod library;

pub use library::{box_model, builtin_models, hierarchy_model, person_model, plane_model, Model};

use crate::animation::{AnimationEngine, Easing};
use crate::camera::{CameraRig, ProjectionKind};
use crate::config::StudioConfig;
use crate::error::{SceneError, StudioError, StudioResult};
use crate::geometry::Geometry;
use crate::math::Vector3;
use crate::scene::{DrawItem, Material, Mesh, NodeId, SceneGraph, SceneNode};
use crate::transform::Transform;

/// Everything a backend needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Camera view-projection, column-major
    pub view_projection: [f32; 16],
    pub items: Vec<DrawItem>,
}

#[derive(Debug)]
pub struct Studio {
    config: StudioConfig,
    models: Vec<Model>,
    active: usize,
    selected: NodeId,
    rig: CameraRig,
    engine: AnimationEngine,
    /// Counter for names of objects created by `add_object`
    created: usize,
}

impl Studio {
    /// Studio over the built-in model library
    pub fn new(config: StudioConfig) -> StudioResult<Self> {
        let models = builtin_models()?;
        Self::with_models(config, models)
    }

    /// Studio over a custom model list; `config.model` picks the first one shown.
    /// Invalid settings are rejected before anything is built.
    pub fn with_models(config: StudioConfig, models: Vec<Model>) -> StudioResult<Self> {
        config.validate()?;
        let active = models
            .iter()
            .position(|m| m.name == config.model)
            .ok_or_else(|| StudioError::UnknownModel(config.model.clone()))?;

        let rig = CameraRig::new(&config.viewport, &config.camera);
        let engine = AnimationEngine::new(config.fps, config.ease);
        let root = models[active].scene.root();

        let mut studio = Self {
            config,
            models,
            active,
            selected: root,
            rig,
            engine,
            created: 0,
        };
        let clip = studio.models[active].clip.take();
        studio.engine.set_clip(clip);
        studio.select_default();
        Ok(studio)
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn model_name(&self) -> &str {
        &self.models[self.active].name
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.models[self.active].scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.models[self.active].scene
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut CameraRig {
        &mut self.rig
    }

    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    /// Switch the active model. The outgoing clip is stored back into its
    /// model; playback restarts stopped at frame 0.
    pub fn change_model(&mut self, name: &str) -> StudioResult<()> {
        let index = self
            .models
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| StudioError::UnknownModel(name.to_string()))?;

        self.models[self.active].clip = self.engine.take_clip();
        self.active = index;
        let clip = self.models[index].clip.take();
        self.engine.set_clip(clip);
        self.select_default();

        log::info!("model changed to {name}");
        Ok(())
    }

    /// First mesh directly under the root, or the root itself
    fn select_default(&mut self) {
        let scene = self.scene();
        let root = scene.root();
        let selected = scene
            .children(root)
            .unwrap_or_default()
            .iter()
            .copied()
            .find(|id| scene.get(*id).map(|n| n.as_mesh().is_some()).unwrap_or(false))
            .unwrap_or(root);
        self.selected = selected;
    }

    pub fn selected(&self) -> NodeId {
        self.selected
    }

    pub fn select(&mut self, id: NodeId) -> StudioResult<()> {
        self.scene().get(id)?;
        self.selected = id;
        Ok(())
    }

    pub fn select_by_name(&mut self, name: &str) -> StudioResult<NodeId> {
        let id = self
            .scene()
            .find_by_name(name)
            .ok_or_else(|| SceneError::NodeNotFound(name.to_string()))?;
        self.selected = id;
        Ok(id)
    }

    pub fn selected_transform(&self) -> StudioResult<Transform> {
        Ok(self.scene().get(self.selected)?.transform)
    }

    fn edit_selected(&mut self, edit: impl FnOnce(&mut Transform)) -> StudioResult<()> {
        let id = self.selected;
        let scene = self.scene_mut();
        edit(&mut scene.get_mut(id)?.transform);
        scene.compute_world_matrix(id, false, true)?;
        Ok(())
    }

    pub fn set_position(&mut self, position: Vector3) -> StudioResult<()> {
        self.edit_selected(|t| t.position = position)
    }

    pub fn set_rotation(&mut self, rotation: Vector3) -> StudioResult<()> {
        self.edit_selected(|t| t.rotation = rotation)
    }

    pub fn set_scale(&mut self, scale: Vector3) -> StudioResult<()> {
        self.edit_selected(|t| t.scale = scale)
    }

    /// Create a default box under the selection and select it
    pub fn add_object(&mut self) -> StudioResult<NodeId> {
        self.created += 1;
        let name = format!("Box{}", self.created);
        let parent = self.selected;
        let node = SceneNode::mesh(name, Mesh::new(Geometry::default(), Material::default()));
        let id = self.scene_mut().spawn_child(parent, node)?;
        self.selected = id;
        Ok(id)
    }

    /// Delete the selection with its subtree and select its parent
    pub fn remove_object(&mut self) -> StudioResult<()> {
        let id = self.selected;
        let scene = self.scene_mut();
        let parent = scene.parent(id)?;
        scene.despawn(id)?;
        let root = scene.root();
        self.selected = parent.unwrap_or(root);
        Ok(())
    }

    /// Import a serialized node tree under the selection
    pub fn import_object(&mut self, json: &str) -> StudioResult<NodeId> {
        let parent = self.selected;
        Ok(self.scene_mut().import_json(json, Some(parent))?)
    }

    /// Serialize the selection and its subtree
    pub fn export_object(&self) -> StudioResult<String> {
        Ok(self.scene().export_json(self.selected)?)
    }

    pub fn set_projection(&mut self, kind: ProjectionKind) {
        self.rig.set_projection(kind);
    }

    pub fn status(&self) -> String {
        self.engine.status()
    }

    fn apply_current(&mut self) {
        let scene = &mut self.models[self.active].scene;
        self.engine.apply_current(scene);
    }

    pub fn play(&mut self) {
        self.engine.play();
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn toggle_reverse(&mut self) -> bool {
        self.engine.toggle_reverse()
    }

    pub fn set_replay(&mut self, replay: bool) {
        self.engine.set_replay(replay);
    }

    pub fn set_ease(&mut self, ease: Easing) {
        self.engine.set_ease(ease);
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.engine.set_fps(fps);
    }

    pub fn next(&mut self) {
        self.engine.next();
        self.apply_current();
    }

    pub fn prev(&mut self) {
        self.engine.prev();
        self.apply_current();
    }

    pub fn first(&mut self) {
        self.engine.first();
        self.apply_current();
    }

    pub fn last(&mut self) {
        self.engine.last();
        self.apply_current();
    }

    pub fn goto(&mut self, frame: usize) {
        self.engine.goto(frame);
        self.apply_current();
    }

    pub fn add_first(&mut self) {
        self.engine.add_first(&self.models[self.active].scene);
    }

    pub fn add_last(&mut self) {
        self.engine.add_last(&self.models[self.active].scene);
    }

    pub fn delete_frame(&mut self) -> StudioResult<()> {
        self.engine.delete_frame()?;
        self.apply_current();
        Ok(())
    }

    pub fn swap_frame_before(&mut self) -> StudioResult<()> {
        Ok(self.engine.swap_frame_before()?)
    }

    pub fn swap_frame_after(&mut self) -> StudioResult<()> {
        Ok(self.engine.swap_frame_after()?)
    }

    pub fn save_frame(&mut self) -> StudioResult<()> {
        Ok(self.engine.save_frame(&self.models[self.active].scene)?)
    }

    pub fn save_animation(&self) -> StudioResult<String> {
        Ok(self.engine.save_animation()?)
    }

    pub fn load_animation(&mut self, json: &str) -> StudioResult<()> {
        self.engine.load_animation(json)?;
        self.apply_current();
        Ok(())
    }

    /// Advance playback by `delta` seconds
    pub fn update(&mut self, delta: f64) {
        let scene = &mut self.models[self.active].scene;
        self.engine.tick(delta, scene);
    }

    /// Snapshot of the active scene as seen by the active camera
    pub fn frame(&mut self) -> StudioResult<Frame> {
        let view_projection = self.rig.view_projection()?.to_column_major();
        let scene = self.scene();
        Ok(Frame {
            view_projection,
            items: scene.draw_list(scene.root()),
        })
    }
}
