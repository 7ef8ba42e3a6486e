/// Keyframes, clips and the pose target they are applied to
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AnimationResult;
use crate::math::{Vector, Vector3};
use crate::scene::SceneGraph;

/// Partial transform of one node; a missing component means "unchanged"
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePose {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vector3>,
}

impl NodePose {
    pub fn full(position: Vector3, rotation: Vector3, scale: Vector3) -> Self {
        Self {
            position: Some(position),
            rotation: Some(rotation),
            scale: Some(scale),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }

    /// Blend towards `next`. Components missing from `self` stay missing so
    /// the node keeps its live value until the next frame commits.
    pub fn interpolate(&self, next: &NodePose, t: f64) -> NodePose {
        fn blend(current: Option<Vector3>, next: Option<Vector3>, t: f64) -> Option<Vector3> {
            match (current, next) {
                (Some(a), Some(b)) => Some(a.lerp(&b, t)),
                (held, _) => held,
            }
        }

        NodePose {
            position: blend(self.position, next.position, t),
            rotation: blend(self.rotation, next.rotation, t),
            scale: blend(self.scale, next.scale, t),
        }
    }
}

/// Node name → pose for one instant of a clip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyframe {
    poses: BTreeMap<String, NodePose>,
}

impl Keyframe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, pose: NodePose) {
        self.poses.insert(name.into(), pose);
    }

    pub fn with(mut self, name: impl Into<String>, pose: NodePose) -> Self {
        self.insert(name, pose);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NodePose> {
        self.poses.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodePose)> {
        self.poses.iter()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Pose `t` of the way from `self` to `next`.
    ///
    /// Nodes absent from `self` are left out entirely.
    pub fn interpolate(&self, next: &Keyframe, t: f64) -> Keyframe {
        let poses = self
            .poses
            .iter()
            .map(|(name, pose)| {
                let blended = match next.poses.get(name) {
                    Some(target) => pose.interpolate(target, t),
                    None => *pose,
                };
                (name.clone(), blended)
            })
            .collect();
        Keyframe { poses }
    }
}

impl FromIterator<(String, NodePose)> for Keyframe {
    fn from_iter<I: IntoIterator<Item = (String, NodePose)>>(iter: I) -> Self {
        Keyframe {
            poses: iter.into_iter().collect(),
        }
    }
}

/// Ordered keyframes; serialized as a bare JSON array
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationClip {
    frames: Vec<Keyframe>,
}

impl AnimationClip {
    pub fn new(frames: Vec<Keyframe>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    pub(crate) fn frames_mut(&mut self) -> &mut Vec<Keyframe> {
        &mut self.frames
    }

    pub fn push(&mut self, frame: Keyframe) {
        self.frames.push(frame);
    }

    pub fn to_json(&self) -> AnimationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> AnimationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Something a keyframe can be read from and written to
pub trait PoseTarget {
    /// Full pose of every node, keyed by name
    fn snapshot(&self) -> Keyframe;

    /// Write every pose whose node exists; others are skipped
    fn apply(&mut self, frame: &Keyframe);
}

impl PoseTarget for SceneGraph {
    fn snapshot(&self) -> Keyframe {
        let mut frame = Keyframe::new();
        for id in self.descendants(self.root()).unwrap_or_default() {
            let Ok(node) = self.get(id) else { continue };
            let t = node.transform;
            frame
                .poses
                .entry(node.name.clone())
                .or_insert_with(|| NodePose::full(t.position, t.rotation, t.scale));
        }
        frame
    }

    fn apply(&mut self, frame: &Keyframe) {
        let index = self.name_index();
        for (name, pose) in frame.iter() {
            let Some(id) = index.get(name) else {
                log::debug!("keyframe names unknown node {name}, skipped");
                continue;
            };
            let Ok(node) = self.get_mut(*id) else { continue };
            if let Some(position) = pose.position {
                node.transform.position = position;
            }
            if let Some(rotation) = pose.rotation {
                node.transform.rotation = rotation;
            }
            if let Some(scale) = pose.scale {
                node.transform.scale = scale;
            }
        }
        self.update_world_matrices();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;
    use crate::transform::Transform;

    fn at(x: f64) -> Vector3 {
        Vector3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_interpolate_components() {
        let current = Keyframe::new()
            .with(
                "arm",
                NodePose {
                    position: Some(at(0.0)),
                    rotation: Some(at(90.0)),
                    scale: None,
                },
            )
            .with("leg", NodePose::full(at(1.0), at(0.0), Vector3::one()));
        let next = Keyframe::new().with(
            "arm",
            NodePose {
                position: Some(at(10.0)),
                rotation: None,
                scale: Some(Vector3::new(2.0, 2.0, 2.0)),
            },
        );

        let blended = current.interpolate(&next, 0.25);
        let arm = blended.get("arm").unwrap();
        assert_eq!(arm.position, Some(at(2.5)));
        // Only in the current frame: held
        assert_eq!(arm.rotation, Some(at(90.0)));
        // Only in the next frame: untouched until the frame commits
        assert_eq!(arm.scale, None);
        assert_eq!(blended.get("leg").unwrap().position, Some(at(1.0)));
    }

    #[test]
    fn test_clip_json_shape() {
        let json = r#"[
            {"Body": {"position": {"x": 0, "y": 1, "z": 0}}},
            {"Body": {"rotation": [0, 45, 0]}, "Head": {}}
        ]"#;
        let clip = AnimationClip::from_json(json).unwrap();
        assert_eq!(clip.len(), 2);
        assert_eq!(
            clip.get(1).unwrap().get("Body").unwrap().rotation,
            Some(Vector3::new(0.0, 45.0, 0.0))
        );
        assert!(clip.get(1).unwrap().get("Head").unwrap().is_empty());

        let restored = AnimationClip::from_json(&clip.to_json().unwrap()).unwrap();
        assert_eq!(restored, clip);

        let value: serde_json::Value = serde_json::from_str(&clip.to_json().unwrap()).unwrap();
        assert!(value[0]["Body"].get("rotation").is_none());
    }

    #[test]
    fn test_scene_snapshot_and_apply() {
        let mut graph = SceneGraph::new("Scene");
        let body = graph
            .spawn_child(
                graph.root(),
                SceneNode::new("Body").with_transform(Transform::from_position(at(3.0))),
            )
            .unwrap();
        let arm = graph.spawn_child(body, SceneNode::new("Arm")).unwrap();

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get("Body").unwrap().position, Some(at(3.0)));

        let frame = Keyframe::new()
            .with(
                "Arm",
                NodePose {
                    position: Some(at(1.0)),
                    ..NodePose::default()
                },
            )
            .with("Ghost", NodePose::full(at(9.0), at(9.0), at(9.0)));
        graph.apply(&frame);

        assert_eq!(graph.get(arm).unwrap().transform.position, at(1.0));
        assert_eq!(graph.get(arm).unwrap().transform.scale, Vector3::one());
        // World matrices follow the applied pose
        assert_eq!(graph.get(arm).unwrap().world_matrix().rows[0][3], 4.0);
    }
}
