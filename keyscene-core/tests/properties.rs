use keyscene_core::{
    AnimationClip, AnimationEngine, Camera, Easing, Geometry, Keyframe, Material, Matrix4, Mesh,
    NodePose, PoseTarget, SceneError, SceneGraph, SceneNode, SquareMatrix, Transform, Vector3,
    Vector4,
};

const EPSILON: f64 = 1e-9;

fn sample_matrix() -> Matrix4 {
    Matrix4::from_rows_slice(&[
        [4.0, 7.0, 2.0, 3.0],
        [0.0, 5.0, 0.0, 1.0],
        [1.0, 0.0, 3.0, 0.0],
        [2.0, 1.0, 0.0, 6.0],
    ])
    .unwrap()
}

fn at(x: f64, y: f64, z: f64) -> Transform {
    Transform::from_position(Vector3::new(x, y, z))
}

fn box_node(name: &str) -> SceneNode {
    SceneNode::mesh(name, Mesh::new(Geometry::cube(100.0), Material::default()))
}

#[test]
fn inverse_round_trips_to_identity() {
    let m = sample_matrix();
    let product = m.multiply(&m.inverse());
    assert!(product.approx_eq(&Matrix4::identity(), EPSILON));

    let n = nalgebra::Matrix4::from_row_slice(&m.flatten());
    let expected = n.try_inverse().unwrap();
    let inverse = m.try_inverse().unwrap();
    for (row, values) in inverse.rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            assert!((value - expected[(row, col)]).abs() < EPSILON);
        }
    }
    assert!((m.determinant() - n.determinant()).abs() < EPSILON);
}

#[test]
fn transpose_is_an_involution() {
    let m = sample_matrix();
    assert_eq!(m.transpose().transpose(), m);
}

#[test]
fn singular_inverse_returns_input() {
    let singular = Matrix4::scaling(1.0, 0.0, 1.0);
    assert_eq!(singular.determinant(), 0.0);
    assert!(singular.try_inverse().is_err());
    assert_eq!(singular.inverse(), singular);
}

#[test]
fn hierarchy_composes_translations() {
    let mut graph = SceneGraph::new("scene");
    let root = graph.root();
    let a = graph.spawn_child(root, SceneNode::new("A").with_transform(at(10.0, 0.0, 0.0))).unwrap();
    let b = graph.spawn_child(a, SceneNode::new("B").with_transform(at(5.0, 0.0, 0.0))).unwrap();
    let c = graph.spawn_child(b, box_node("C").with_transform(at(2.0, 0.0, 0.0))).unwrap();

    graph.compute_world_matrix(root, false, true).unwrap();
    let origin = graph.get(c).unwrap().world_matrix().transform_point(&Vector3::default());
    assert!(origin.approx_eq(&Vector4::new(17.0, 0.0, 0.0, 1.0), EPSILON));
}

#[test]
fn reparenting_keeps_a_single_parent() {
    let mut graph = SceneGraph::new("scene");
    let root = graph.root();
    let p1 = graph.spawn_child(root, SceneNode::new("P1")).unwrap();
    let p2 = graph
        .spawn_child(root, SceneNode::new("P2").with_transform(at(0.0, 50.0, 0.0)))
        .unwrap();
    let child = graph.spawn_child(p1, box_node("child")).unwrap();

    graph.add(p2, child).unwrap();

    assert!(!graph.children(p1).unwrap().contains(&child));
    assert_eq!(graph.children(p2).unwrap(), &[child]);
    assert_eq!(graph.parent(child).unwrap(), Some(p2));

    let y = graph.get(child).unwrap().world_matrix().rows[1][3];
    assert!((y - 50.0).abs() < EPSILON);
}

#[test]
fn adding_an_ancestor_under_its_descendant_fails() {
    let mut graph = SceneGraph::new("scene");
    let root = graph.root();
    let a = graph.spawn_child(root, SceneNode::new("A")).unwrap();
    let b = graph.spawn_child(a, SceneNode::new("B")).unwrap();

    assert!(matches!(graph.add(b, a), Err(SceneError::CycleDetected { .. })));
    assert!(matches!(graph.add(a, a), Err(SceneError::CycleDetected { .. })));
    assert_eq!(graph.parent(a).unwrap(), Some(root));
}

#[test]
fn easing_boundaries_and_monotonicity() {
    for ease in Easing::ALL {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease} at 1");

        let mut previous = 0.0;
        for step in 1..=100 {
            let value = ease.apply(step as f64 / 100.0);
            assert!(value >= previous - 1e-12, "{ease} not monotonic");
            previous = value;
        }
    }
}

/// Three keyframes moving a single node along x
fn three_frame_clip() -> AnimationClip {
    AnimationClip::new(
        (0..3)
            .map(|i| {
                Keyframe::new().with(
                    "C",
                    NodePose {
                        position: Some(Vector3::new(i as f64 * 10.0, 0.0, 0.0)),
                        ..NodePose::default()
                    },
                )
            })
            .collect(),
    )
}

fn scene_with_c() -> (SceneGraph, keyscene_core::NodeId) {
    let mut graph = SceneGraph::new("scene");
    let root = graph.root();
    let c = graph.spawn_child(root, box_node("C")).unwrap();
    (graph, c)
}

#[test]
fn replay_wraps_and_non_replay_stops() {
    let (mut graph, c) = scene_with_c();
    let mut engine = AnimationEngine::new(30.0, Easing::Linear);
    engine.set_clip(Some(three_frame_clip()));

    engine.set_replay(true);
    engine.goto(2);
    engine.next();
    assert_eq!(engine.frame(), 0);

    engine.set_replay(false);
    engine.goto(2);
    engine.play();
    engine.tick(1.0, &mut graph);
    assert_eq!(engine.frame(), 2);
    assert!(!engine.is_playing());

    engine.apply_current(&mut graph);
    let x = graph.get(c).unwrap().transform.position.x;
    assert!((x - 20.0).abs() < EPSILON);
}

#[test]
fn tick_blends_between_frames_without_committing() {
    let (mut graph, c) = scene_with_c();
    let mut engine = AnimationEngine::new(10.0, Easing::Linear);
    engine.set_clip(Some(three_frame_clip()));
    engine.play();

    engine.tick(0.05, &mut graph);
    assert_eq!(engine.frame(), 0);
    let x = graph.get(c).unwrap().transform.position.x;
    assert!((x - 5.0).abs() < 1e-6);

    engine.tick(0.06, &mut graph);
    assert_eq!(engine.frame(), 1);
    let x = graph.get(c).unwrap().transform.position.x;
    assert!((x - 10.0).abs() < EPSILON);
}

#[test]
fn navigation_without_clip_is_a_no_op() {
    let (mut graph, _) = scene_with_c();
    let mut engine = AnimationEngine::default();
    engine.next();
    engine.prev();
    engine.play();
    engine.tick(1.0, &mut graph);
    assert_eq!(engine.length(), 0);
    assert_eq!(engine.frame(), 0);
    assert!(!engine.is_playing());
    assert_eq!(engine.status(), "No Animation");
}

#[test]
fn scene_serialization_round_trip() {
    let mut graph = SceneGraph::new("scene");
    let root = graph.root();
    let group = graph
        .spawn_child(root, SceneNode::new("group").with_transform(at(1.0, 2.0, 3.0)))
        .unwrap();
    let mut transform = at(4.0, 5.0, 6.0);
    transform.rotation = Vector3::new(10.0, 20.0, 30.0);
    transform.scale = Vector3::new(2.0, 2.0, 2.0);
    graph.spawn_child(group, box_node("box").with_transform(transform)).unwrap();

    let json = graph.export_json(group).unwrap();
    let restored = SceneGraph::from_json(&json).unwrap();
    let again = restored.export_json(restored.root()).unwrap();
    assert_eq!(json, again);

    let node = restored.get(restored.find_by_name("box").unwrap()).unwrap();
    assert_eq!(node.transform, transform);
    assert!(node.as_mesh().is_some());
}

#[test]
fn unknown_node_type_is_rejected() {
    let json = r#"{"name":"light","type":"light","position":{"x":0,"y":0,"z":0},
        "rotation":{"x":0,"y":0,"z":0},"scale":{"x":1,"y":1,"z":1},"children":[]}"#;
    match SceneGraph::from_json(json) {
        Err(SceneError::UnsupportedNodeType(kind)) => assert_eq!(kind, "light"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn snapshot_apply_round_trip() {
    let (mut graph, c) = scene_with_c();
    graph.get_mut(c).unwrap().transform.position = Vector3::new(3.0, 4.0, 5.0);
    let pose = graph.snapshot();

    graph.get_mut(c).unwrap().transform = Transform::identity();
    graph.apply(&pose);
    assert_eq!(graph.get(c).unwrap().transform.position, Vector3::new(3.0, 4.0, 5.0));

    let clip = AnimationClip::new(vec![pose]);
    let restored = AnimationClip::from_json(&clip.to_json().unwrap()).unwrap();
    assert_eq!(restored, clip);
}

#[test]
fn orthographic_maps_centre_to_origin() {
    let projection = Matrix4::orthographic(-400.0, 400.0, -300.0, 300.0, -500.0, 500.0);
    let centre = projection.transform_point(&Vector3::default());
    assert!(centre.approx_eq(&Vector4::new(0.0, 0.0, 0.0, 1.0), EPSILON));
}

#[test]
fn perspective_maps_near_plane_to_minus_one() {
    let near = 0.5;
    let projection = Matrix4::perspective(60.0, near, 4.0 / 3.0, 100.0);
    let clip = projection.transform_point(&Vector3::new(0.0, 0.0, -near));
    assert!((clip.z / clip.w + 1.0).abs() < 1e-9);
}

#[test]
fn identity_camera_view_projection_is_its_projection() {
    let mut graph = SceneGraph::new("scene");
    let root = graph.root();
    let camera = graph
        .spawn_child(
            root,
            SceneNode::camera("cam", Camera::orthographic(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)),
        )
        .unwrap();

    let vp = graph.view_projection_matrix(camera).unwrap();
    let projection = *graph.camera(camera).unwrap().projection_matrix();
    assert!(vp.approx_eq(&projection, EPSILON));
}
