//! Studio settings
//!
//! Resolution order:
//!
//! 1. command-line flags of the driver binary
//! 2. a JSON config file
//! 3. the defaults below

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::animation::Easing;
use crate::camera::ProjectionKind;
use crate::error::ConfigError;

/// Top-level settings of a [`Studio`](crate::Studio)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Animation frames per second
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// Easing used between keyframes
    #[serde(default)]
    pub ease: Easing,

    /// Library model shown at start-up
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub camera: CameraConfig,
}

/// Drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,

    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

impl ViewportConfig {
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Camera rig settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Projection active at start-up
    #[serde(default)]
    pub projection: ProjectionKind,

    /// Depth of the parallel view volumes; near/far sit at ∓depth/2
    #[serde(default = "default_depth")]
    pub depth: f64,

    #[serde(default)]
    pub perspective: PerspectiveConfig,

    #[serde(default)]
    pub oblique: ObliqueConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f64,

    #[serde(default = "default_near")]
    pub near: f64,

    #[serde(default = "default_far")]
    pub far: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObliqueConfig {
    /// Receding axis angle in degrees
    #[serde(default = "default_oblique_angle")]
    pub angle: f64,

    /// Receding axis length ratio (0.5 cabinet, 1.0 cavalier)
    #[serde(default = "default_oblique_factor")]
    pub factor: f64,
}

fn default_fps() -> f64 {
    30.0
}

fn default_model() -> String {
    "box".to_string()
}

fn default_viewport_width() -> f64 {
    800.0
}

fn default_viewport_height() -> f64 {
    600.0
}

fn default_depth() -> f64 {
    1000.0
}

fn default_fov() -> f64 {
    60.0
}

fn default_near() -> f64 {
    0.01
}

fn default_far() -> f64 {
    999.0
}

fn default_oblique_angle() -> f64 {
    45.0
}

fn default_oblique_factor() -> f64 {
    0.5
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            ease: Easing::default(),
            model: default_model(),
            viewport: ViewportConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::default(),
            depth: default_depth(),
            perspective: PerspectiveConfig::default(),
            oblique: ObliqueConfig::default(),
        }
    }
}

impl Default for PerspectiveConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl Default for ObliqueConfig {
    fn default() -> Self {
        Self {
            angle: default_oblique_angle(),
            factor: default_oblique_factor(),
        }
    }
}

impl StudioConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the camera and animation code cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        }

        positive("fps", self.fps)?;
        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        positive("camera.depth", self.camera.depth)?;
        positive("camera.perspective.near", self.camera.perspective.near)?;

        let fov = self.camera.perspective.fov;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::InvalidValue {
                key: "camera.perspective.fov".to_string(),
                value: fov.to_string(),
            });
        }
        if self.camera.perspective.far <= self.camera.perspective.near {
            return Err(ConfigError::InvalidValue {
                key: "camera.perspective.far".to_string(),
                value: self.camera.perspective.far.to_string(),
            });
        }
        Ok(())
    }
}
