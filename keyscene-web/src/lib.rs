//! keyscene web - wasm-bindgen editor surface over the core studio
//!
//! The page owns the canvas and the GPU upload. This crate sizes the cameras
//! from the canvas, forwards editor and orbit controls to a [`Studio`] and
//! hands back column-major matrices ready for `uniformMatrix4fv`.

use keyscene_core::{Easing, ProjectionKind, Studio, StudioConfig, Vector3};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WebEditor {
    studio: Studio,
    /// Draw list of the last `tick`, consumed by the page
    world_matrices: Vec<f32>,
    view_projection: Vec<f32>,
    names: Vec<String>,
}

#[wasm_bindgen]
impl WebEditor {
    /// Editor over the built-in models; `config_json` may be empty
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WebEditor, JsValue> {
        let config = if config_json.trim().is_empty() {
            StudioConfig::default()
        } else {
            StudioConfig::from_json(config_json).map_err(js_error)?
        };
        let studio = Studio::new(config).map_err(js_error)?;
        Ok(WebEditor {
            studio,
            world_matrices: Vec::new(),
            view_projection: Vec::new(),
            names: Vec::new(),
        })
    }

    /// Fit the cameras to the client size of the canvas with id `canvas_id`
    pub fn attach(&mut self, canvas_id: &str) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {canvas_id}")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("{canvas_id} is not a canvas")))?;

        self.resize(canvas.client_width() as f64, canvas.client_height() as f64)
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.studio
            .rig_mut()
            .resize(width, height)
            .map_err(js_error)
    }

    /// Advance playback by `delta` seconds and rebuild the draw list
    pub fn tick(&mut self, delta: f64) -> Result<(), JsValue> {
        self.studio.update(delta);
        let frame = self.studio.frame().map_err(js_error)?;

        self.view_projection = frame.view_projection.to_vec();
        self.world_matrices = frame
            .items
            .iter()
            .flat_map(|item| item.world_matrix)
            .collect();
        self.names = frame.items.into_iter().map(|item| item.name).collect();
        Ok(())
    }

    /// Column-major view-projection of the last tick
    pub fn view_projection(&self) -> Vec<f32> {
        self.view_projection.clone()
    }

    /// World matrices of the last tick, 16 floats per mesh
    pub fn world_matrices(&self) -> Vec<f32> {
        self.world_matrices.clone()
    }

    pub fn mesh_names(&self) -> Vec<String> {
        self.names.clone()
    }

    pub fn status(&self) -> String {
        self.studio.status()
    }

    pub fn model_names(&self) -> Vec<String> {
        self.studio.model_names().into_iter().map(String::from).collect()
    }

    pub fn change_model(&mut self, name: &str) -> Result<(), JsValue> {
        self.studio.change_model(name).map_err(js_error)
    }

    pub fn select(&mut self, name: &str) -> Result<(), JsValue> {
        self.studio.select_by_name(name).map(|_| ()).map_err(js_error)
    }

    pub fn selected_name(&self) -> Option<String> {
        let id = self.studio.selected();
        self.studio.scene().get(id).ok().map(|n| n.name.clone())
    }

    pub fn set_position(&mut self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.studio
            .set_position(Vector3::new(x, y, z))
            .map_err(js_error)
    }

    pub fn set_rotation(&mut self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.studio
            .set_rotation(Vector3::new(x, y, z))
            .map_err(js_error)
    }

    pub fn set_scale(&mut self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.studio.set_scale(Vector3::new(x, y, z)).map_err(js_error)
    }

    pub fn add_object(&mut self) -> Result<(), JsValue> {
        self.studio.add_object().map(|_| ()).map_err(js_error)
    }

    pub fn remove_object(&mut self) -> Result<(), JsValue> {
        self.studio.remove_object().map_err(js_error)
    }

    pub fn import_object(&mut self, json: &str) -> Result<(), JsValue> {
        self.studio.import_object(json).map(|_| ()).map_err(js_error)
    }

    pub fn export_object(&self) -> Result<String, JsValue> {
        self.studio.export_object().map_err(js_error)
    }

    pub fn set_projection(&mut self, name: &str) -> Result<(), JsValue> {
        let kind: ProjectionKind = name.parse().map_err(js_error)?;
        self.studio.set_projection(kind);
        Ok(())
    }

    pub fn zoom(&mut self, value: f64) -> Result<f64, JsValue> {
        self.studio.rig_mut().zoom(value).map_err(js_error)
    }

    /// Mouse-drag orbit with movement deltas in pixels
    pub fn orbit(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.studio.rig_mut().orbit(dx, dy).map_err(js_error)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.studio.rig_mut().pan(dx, dy).map_err(js_error)
    }

    pub fn reset_camera(&mut self) -> Result<(), JsValue> {
        self.studio.rig_mut().reset().map_err(js_error)
    }

    pub fn play(&mut self) {
        self.studio.play();
    }

    pub fn pause(&mut self) {
        self.studio.pause();
    }

    pub fn next(&mut self) {
        self.studio.next();
    }

    pub fn prev(&mut self) {
        self.studio.prev();
    }

    pub fn first(&mut self) {
        self.studio.first();
    }

    pub fn last(&mut self) {
        self.studio.last();
    }

    pub fn toggle_reverse(&mut self) -> bool {
        self.studio.toggle_reverse()
    }

    pub fn set_replay(&mut self, replay: bool) {
        self.studio.set_replay(replay);
    }

    pub fn set_ease(&mut self, name: &str) -> Result<(), JsValue> {
        let ease: Easing = name.parse().map_err(js_error)?;
        self.studio.set_ease(ease);
        Ok(())
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.studio.set_fps(fps);
    }

    pub fn add_first(&mut self) {
        self.studio.add_first();
    }

    pub fn add_last(&mut self) {
        self.studio.add_last();
    }

    pub fn delete_frame(&mut self) -> Result<(), JsValue> {
        self.studio.delete_frame().map_err(js_error)
    }

    pub fn swap_frame_before(&mut self) -> Result<(), JsValue> {
        self.studio.swap_frame_before().map_err(js_error)
    }

    pub fn swap_frame_after(&mut self) -> Result<(), JsValue> {
        self.studio.swap_frame_after().map_err(js_error)
    }

    pub fn save_frame(&mut self) -> Result<(), JsValue> {
        self.studio.save_frame().map_err(js_error)
    }

    pub fn save_animation(&self) -> Result<String, JsValue> {
        self.studio.save_animation().map_err(js_error)
    }

    pub fn load_animation(&mut self, json: &str) -> Result<(), JsValue> {
        self.studio.load_animation(json).map_err(js_error)
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    log::debug!("keyscene web module loaded");
    Ok(())
}
