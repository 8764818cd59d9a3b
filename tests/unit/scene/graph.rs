use super::*;

fn scene(json: &str) -> Scene {
    Scene::from_reader(json.as_bytes()).unwrap()
}

fn names(nodes: &[NodeRef<'_>]) -> Vec<String> {
    nodes.iter().map(|n| n.name().to_string()).collect()
}

const RIG: &str = r#"{
  "objects": [
    {"name": "Armature", "type": "ARMATURE", "children": ["Body", "Teeth"]},
    {"name": "Body", "shape_keys": ["Basis", "JawOpen"], "children": ["Lashes"]},
    {"name": "Lashes", "type": "MESH", "shape_keys": ["EyeBlinkLeft"]},
    {"name": "Teeth", "type": "MESH"},
    {"name": "Light", "type": "LIGHT"}
  ],
  "collections": [
    {"name": "grp", "objects": ["Armature", "Light"], "children": ["sub"]},
    {"name": "sub", "objects": ["Teeth"], "children": ["grp"]}
  ]
}"#;

#[test]
fn objects_default_to_mesh_and_expose_shape_keys() {
    let s = scene(RIG);
    let body = s.object_node("Body").unwrap();
    assert_eq!(body.kind(), NodeKind::Mesh);
    assert_eq!(body.controls(), &["Basis".to_string(), "JawOpen".to_string()]);

    let armature = s.object_node("Armature").unwrap();
    assert_eq!(armature.kind(), NodeKind::Group);
    assert!(armature.controls().is_empty());
    assert_eq!(s.resolution(), (320, 180));
}

#[test]
fn collection_children_list_objects_before_collections() {
    let s = scene(RIG);
    let grp = s.collection_node("grp").unwrap();
    assert_eq!(names(&grp.children()), vec!["Armature", "Light", "sub"]);
}

#[test]
fn descendants_visit_shared_nodes_once_and_survive_cycles() {
    let s = scene(RIG);
    let all = descendants(s.collection_node("grp").unwrap());
    assert_eq!(
        names(&all),
        vec!["Armature", "Body", "Lashes", "Teeth", "Light", "sub"]
    );
}

#[test]
fn descendants_of_a_leaf_are_empty() {
    let s = scene(RIG);
    assert!(descendants(s.object_node("Teeth").unwrap()).is_empty());
}

#[test]
fn dangling_references_are_configuration_errors() {
    let err = Scene::from_reader(
        r#"{"objects": [{"name": "A", "children": ["Ghost"]}]}"#.as_bytes(),
    )
    .unwrap_err();
    assert!(matches!(err, FacecastError::Configuration(_)));
    assert!(err.to_string().contains("Ghost"));

    let err = Scene::from_reader(
        r#"{"collections": [{"name": "c", "children": ["missing"]}]}"#.as_bytes(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown collection 'missing'"));
}

#[test]
fn duplicate_names_are_rejected() {
    let err = Scene::from_reader(r#"{"objects": [{"name": "A"}, {"name": "A"}]}"#.as_bytes())
        .unwrap_err();
    assert!(matches!(err, FacecastError::Configuration(_)));
}

#[test]
fn invalid_json_is_a_configuration_error() {
    let err = Scene::from_reader("{".as_bytes()).unwrap_err();
    assert!(matches!(err, FacecastError::Configuration(_)));
}

#[test]
fn zero_resolution_is_rejected() {
    assert!(Scene::from_reader(r#"{"resolution": [0, 10]}"#.as_bytes()).is_err());
}
