//! Plain-tree export/import of scene nodes

use serde::{Deserialize, Serialize};

use super::{Mesh, NodeId, NodeKind, SceneGraph, SceneNode};
use crate::camera::{Camera, CameraParams};
use crate::error::{SceneError, SceneResult};
use crate::geometry::{Geometry, GeometryParams};
use crate::math::Vector3;
use crate::transform::Transform;

/// Interchange shape of a node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub position: Vector3,
    #[serde(default)]
    pub rotation: Vector3,
    #[serde(default = "Vector3::one")]
    pub scale: Vector3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraParams>,
    #[serde(default)]
    pub children: Vec<SerializedNode>,
}

impl SerializedNode {
    fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, self.scale)
    }

    /// Allocate the concrete node for this entry (children not included)
    fn to_node(&self) -> SceneResult<SceneNode> {
        let kind = match self.kind.as_str() {
            "node" => NodeKind::Node,
            "scene" => NodeKind::Scene,
            "mesh" => {
                let geometry = self
                    .geometry
                    .map(Geometry::from_params)
                    .unwrap_or_default();
                NodeKind::Mesh(Mesh {
                    geometry,
                    ..Mesh::default()
                })
            }
            "camera" => {
                let params = self
                    .camera
                    .ok_or_else(|| SceneError::MissingCamera(self.name.clone()))?;
                NodeKind::Camera(Camera::from_params(params))
            }
            other => return Err(SceneError::UnsupportedNodeType(other.to_string())),
        };
        Ok(SceneNode::with_kind(self.name.clone(), kind).with_transform(self.transform()))
    }

    /// Reject unsupported types anywhere in the tree before anything is built
    fn validate(&self) -> SceneResult<()> {
        self.to_node()?;
        self.children.iter().try_for_each(SerializedNode::validate)
    }
}

impl SceneGraph {
    /// Export `id` and its subtree
    pub fn export(&self, id: NodeId) -> SceneResult<SerializedNode> {
        let node = self.get(id)?;
        let children = node
            .children
            .iter()
            .map(|child| self.export(*child))
            .collect::<SceneResult<Vec<_>>>()?;

        Ok(SerializedNode {
            name: node.name.clone(),
            kind: node.kind.type_tag().to_string(),
            position: node.transform.position,
            rotation: node.transform.rotation,
            scale: node.transform.scale,
            geometry: node.as_mesh().map(|mesh| mesh.geometry.params()),
            camera: node.as_camera().map(Camera::params),
            children,
        })
    }

    pub fn export_json(&self, id: NodeId) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(&self.export(id)?)?)
    }

    /// Build a detached subtree from `data`, attaching it under `parent`
    /// when given. Nothing is inserted if any node has an unsupported type.
    pub fn import(&mut self, data: &SerializedNode, parent: Option<NodeId>) -> SceneResult<NodeId> {
        data.validate()?;
        if let Some(parent) = parent {
            self.get(parent)?;
        }

        let id = self.build(data)?;
        match parent {
            Some(parent) => self.add(parent, id)?,
            None => self.compute_world_matrix(id, false, true)?,
        }
        Ok(id)
    }

    pub fn import_json(&mut self, json: &str, parent: Option<NodeId>) -> SceneResult<NodeId> {
        let data: SerializedNode = serde_json::from_str(json)?;
        self.import(&data, parent)
    }

    /// A new graph whose root is the imported top-level node
    pub fn from_serialized(data: &SerializedNode) -> SceneResult<Self> {
        data.validate()?;
        let mut graph = SceneGraph::with_root(data.to_node()?);
        let root = graph.root();
        for child in &data.children {
            graph.import(child, Some(root))?;
        }
        Ok(graph)
    }

    pub fn from_json(json: &str) -> SceneResult<Self> {
        let data: SerializedNode = serde_json::from_str(json)?;
        Self::from_serialized(&data)
    }

    fn build(&mut self, data: &SerializedNode) -> SceneResult<NodeId> {
        let id = self.spawn(data.to_node()?);
        for child in &data.children {
            let child_id = self.build(child)?;
            self.get_mut(child_id)?.parent = Some(id);
            self.get_mut(id)?.children.push(child_id);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    fn sample() -> SceneGraph {
        let mut graph = SceneGraph::new("Scene");
        let root = graph.root();
        let parent = graph
            .spawn_child(
                root,
                SceneNode::mesh(
                    "ParentBox",
                    Mesh::new(
                        Geometry::Box {
                            width: 200.0,
                            height: 200.0,
                            depth: 200.0,
                        },
                        Default::default(),
                    ),
                )
                .with_transform(Transform::new(
                    Vector3::zero(),
                    Vector3::new(0.0, 0.0, 90.0),
                    Vector3::new(1.6, 1.0, 1.0),
                )),
            )
            .unwrap();
        graph
            .spawn_child(
                parent,
                SceneNode::mesh("ChildBox", Mesh::new(Geometry::cube(150.0), Default::default()))
                    .with_transform(Transform::from_position(Vector3::new(0.0, 400.0, 0.0))),
            )
            .unwrap();
        graph.spawn_child(root, SceneNode::new("Pivot")).unwrap();
        graph
    }

    fn assert_same_tree(a: &SerializedNode, b: &SerializedNode) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.position, b.position);
        assert_eq!(a.rotation, b.rotation);
        assert_eq!(a.scale, b.scale);
        assert_eq!(a.geometry, b.geometry);
        assert_eq!(a.camera, b.camera);
        assert_eq!(a.children.len(), b.children.len());
        for (x, y) in a.children.iter().zip(&b.children) {
            assert_same_tree(x, y);
        }
    }

    #[test]
    fn test_round_trip_through_json() {
        let graph = sample();
        let json = graph.export_json(graph.root()).unwrap();
        let restored = SceneGraph::from_json(&json).unwrap();

        assert_same_tree(
            &graph.export(graph.root()).unwrap(),
            &restored.export(restored.root()).unwrap(),
        );
        assert!(matches!(
            restored.get(restored.find_by_name("ChildBox").unwrap()).unwrap().kind,
            NodeKind::Mesh(_)
        ));
    }

    #[test]
    fn test_import_attaches_and_computes_world() {
        let mut graph = sample();
        let parent = graph.find_by_name("Pivot").unwrap();
        graph.get_mut(parent).unwrap().transform.position.x = 50.0;
        graph.compute_world_matrix(parent, true, false).unwrap();

        let json = r#"{"name":"Imported","type":"node","position":{"x":1,"y":0,"z":0},
            "rotation":{"x":0,"y":0,"z":0},"scale":{"x":1,"y":1,"z":1},"children":[]}"#;
        let id = graph.import_json(json, Some(parent)).unwrap();

        assert_eq!(graph.parent(id).unwrap(), Some(parent));
        assert_eq!(graph.get(id).unwrap().world_matrix().rows[0][3], 51.0);
    }

    #[test]
    fn test_unsupported_type_names_the_type_and_inserts_nothing() {
        let mut graph = sample();
        let before = graph.len();
        let json = r#"{"name":"A","type":"node","children":[{"name":"B","type":"light"}]}"#;

        match graph.import_json(json, Some(graph.root())) {
            Err(SceneError::UnsupportedNodeType(tag)) => assert_eq!(tag, "light"),
            other => panic!("expected unsupported type, got {other:?}"),
        }
        assert_eq!(graph.len(), before);
    }

    #[test]
    fn test_camera_nodes_round_trip() {
        let mut graph = sample();
        let pivot = graph.find_by_name("Pivot").unwrap();
        let mut camera = Camera::perspective(60.0, 0.01, 4.0 / 3.0, 999.0);
        camera.set_zoom(1.5);
        camera.compute_projection_matrix();
        graph
            .spawn_child(
                pivot,
                SceneNode::camera("Eye", camera.clone())
                    .with_transform(Transform::from_position(Vector3::new(0.0, 0.0, 400.0))),
            )
            .unwrap();

        let json = graph.export_json(graph.root()).unwrap();
        let mut restored = SceneGraph::from_json(&json).unwrap();
        assert_same_tree(
            &graph.export(graph.root()).unwrap(),
            &restored.export(restored.root()).unwrap(),
        );

        let eye = restored.find_by_name("Eye").unwrap();
        assert_eq!(
            restored.camera(eye).unwrap().projection_matrix(),
            camera.projection_matrix()
        );
        assert!(restored.view_projection_matrix(eye).is_ok());
    }

    #[test]
    fn test_camera_without_settings_is_rejected() {
        let json = r#"{"name":"Root","type":"scene","children":[{"name":"Eye","type":"camera"}]}"#;
        match SceneGraph::from_json(json) {
            Err(SceneError::MissingCamera(name)) => assert_eq!(name, "Eye"),
            other => panic!("expected missing camera, got {other:?}"),
        }
    }

    #[test]
    fn test_mesh_geometry_dispatch() {
        let json = r#"{"name":"Root","type":"scene","children":[
            {"name":"Floor","type":"mesh","geometry":{"width":700,"height":700,"depth":0}},
            {"name":"Crate","type":"mesh","geometry":{"width":1,"height":2,"depth":3}}
        ]}"#;
        let graph = SceneGraph::from_json(json).unwrap();
        let floor = graph.get(graph.find_by_name("Floor").unwrap()).unwrap();
        assert_eq!(
            floor.as_mesh().unwrap().geometry,
            Geometry::Plane {
                width: 700.0,
                height: 700.0
            }
        );
        let crate_node = graph.get(graph.find_by_name("Crate").unwrap()).unwrap();
        assert_eq!(crate_node.transform.scale, Vector3::one());
        assert!(matches!(
            crate_node.as_mesh().unwrap().geometry,
            Geometry::Box { depth, .. } if depth == 3.0
        ));
    }

    #[test]
    fn test_exported_shape() {
        let graph = sample();
        let value: serde_json::Value =
            serde_json::from_str(&graph.export_json(graph.root()).unwrap()).unwrap();
        assert_eq!(value["type"], "scene");
        assert_eq!(value["children"][0]["geometry"]["width"], 200.0);
        assert_eq!(value["children"][0]["scale"]["x"], 1.6);
        assert!(value["children"][1].get("geometry").is_none());
    }
}
