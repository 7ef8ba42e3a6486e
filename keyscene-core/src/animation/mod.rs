//! Keyframe animation: clips, easing and the playback engine

mod clip;
mod easing;
mod engine;

pub use clip::{AnimationClip, Keyframe, NodePose, PoseTarget};
pub use easing::Easing;
pub use engine::AnimationEngine;
