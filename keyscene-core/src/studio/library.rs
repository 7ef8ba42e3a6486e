//! Built-in models

use crate::animation::{AnimationClip, Keyframe, NodePose};
use crate::error::SceneResult;
use crate::geometry::Geometry;
use crate::math::Vector3;
use crate::scene::{Material, MaterialKind, Mesh, NodeId, SceneGraph, SceneNode};
use crate::transform::Transform;

/// A named scene plus the clip that animates it
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub scene: SceneGraph,
    pub clip: Option<AnimationClip>,
}

impl Model {
    pub fn new(name: impl Into<String>, scene: SceneGraph) -> Self {
        Self {
            name: name.into(),
            scene,
            clip: None,
        }
    }

    pub fn with_clip(mut self, clip: AnimationClip) -> Self {
        self.clip = Some(clip);
        self
    }
}

/// Every model shipped with the studio, in menu order
pub fn builtin_models() -> SceneResult<Vec<Model>> {
    Ok(vec![
        box_model()?,
        plane_model()?,
        hierarchy_model()?,
        person_model()?,
    ])
}

fn box_mesh(width: f64, height: f64, depth: f64, material: Material) -> Mesh {
    Mesh::new(
        Geometry::Box {
            width,
            height,
            depth,
        },
        material,
    )
}

fn colored(diffuse: [f32; 3]) -> Material {
    Material {
        diffuse,
        ..Material::default()
    }
}

pub fn box_model() -> SceneResult<Model> {
    let mut scene = SceneGraph::new("Scene");
    scene.spawn_child(
        scene.root(),
        SceneNode::mesh("Box", Mesh::new(Geometry::cube(200.0), Material::default())),
    )?;
    Ok(Model::new("box", scene))
}

pub fn plane_model() -> SceneResult<Model> {
    let mut scene = SceneGraph::new("Scene");
    scene.spawn_child(
        scene.root(),
        SceneNode::mesh(
            "Plane",
            Mesh::new(
                Geometry::Plane {
                    width: 700.0,
                    height: 700.0,
                },
                Material::default(),
            ),
        ),
    )?;
    Ok(Model::new("plane", scene))
}

/// A stretched, rotated box carrying a smaller box
pub fn hierarchy_model() -> SceneResult<Model> {
    let mut scene = SceneGraph::new("Scene");
    let parent = scene.spawn_child(
        scene.root(),
        SceneNode::mesh("ParentBox", Mesh::new(Geometry::cube(200.0), Material::default()))
            .with_transform(Transform::new(
                Vector3::zero(),
                Vector3::new(0.0, 0.0, 90.0),
                Vector3::new(1.6, 1.0, 1.0),
            )),
    )?;
    scene.spawn_child(
        parent,
        SceneNode::mesh("ChildBox", Mesh::new(Geometry::cube(150.0), Material::default()))
            .with_transform(Transform::from_position(Vector3::new(0.0, 400.0, 0.0))),
    )?;
    Ok(Model::new("hierarchy", scene))
}

const LIMBS: [&str; 4] = ["LeftArm", "RightArm", "LeftLeg", "RightLeg"];

fn limb(
    scene: &mut SceneGraph,
    parent: NodeId,
    name: &str,
    at: Vector3,
    size: (f64, f64),
    material: Material,
) -> SceneResult<NodeId> {
    // Limbs hang from a pivot so rotations swing them about the joint
    let pivot = scene.spawn_child(
        parent,
        SceneNode::new(name).with_transform(Transform::from_position(at)),
    )?;
    scene.spawn_child(
        pivot,
        SceneNode::mesh(
            format!("{name}Mesh"),
            box_mesh(size.0, size.1, size.0, material),
        )
        .with_transform(Transform::from_position(Vector3::new(0.0, -size.1 / 2.0, 0.0))),
    )?;
    Ok(pivot)
}

/// Articulated figure with a walk cycle
pub fn person_model() -> SceneResult<Model> {
    let skin = colored([0.96, 0.8, 0.69]);
    let shirt = Material {
        kind: MaterialKind::Phong,
        diffuse: [0.2, 0.4, 0.8],
        specular: [1.0, 1.0, 1.0],
        shininess: 16.0,
    };
    let trousers = colored([0.25, 0.25, 0.3]);

    let mut scene = SceneGraph::new("Scene");
    let torso = scene.spawn_child(
        scene.root(),
        SceneNode::mesh("Torso", box_mesh(120.0, 180.0, 60.0, shirt)),
    )?;
    scene.spawn_child(
        torso,
        SceneNode::mesh("Head", box_mesh(80.0, 80.0, 80.0, skin))
            .with_transform(Transform::from_position(Vector3::new(0.0, 140.0, 0.0))),
    )?;

    limb(&mut scene, torso, "LeftArm", Vector3::new(-85.0, 85.0, 0.0), (40.0, 160.0), skin)?;
    limb(&mut scene, torso, "RightArm", Vector3::new(85.0, 85.0, 0.0), (40.0, 160.0), skin)?;
    limb(&mut scene, torso, "LeftLeg", Vector3::new(-35.0, -90.0, 0.0), (50.0, 180.0), trousers)?;
    limb(&mut scene, torso, "RightLeg", Vector3::new(35.0, -90.0, 0.0), (50.0, 180.0), trousers)?;

    Ok(Model::new("person", scene).with_clip(walk_clip()))
}

/// Four-beat walk: limbs swing about X in opposite phase, the torso bobs
fn walk_clip() -> AnimationClip {
    let swing = |angles: [f64; 4], bob: f64| {
        let mut frame = Keyframe::new().with(
            "Torso",
            NodePose {
                position: Some(Vector3::new(0.0, bob, 0.0)),
                ..NodePose::default()
            },
        );
        for (name, angle) in LIMBS.iter().zip(angles) {
            frame.insert(
                *name,
                NodePose {
                    rotation: Some(Vector3::new(angle, 0.0, 0.0)),
                    ..NodePose::default()
                },
            );
        }
        frame
    };

    AnimationClip::new(vec![
        swing([30.0, -30.0, -30.0, 30.0], 0.0),
        swing([0.0, 0.0, 0.0, 0.0], 10.0),
        swing([-30.0, 30.0, 30.0, -30.0], 0.0),
        swing([0.0, 0.0, 0.0, 0.0], 10.0),
    ])
}
