use super::*;
use crate::mapping::selector::DEFAULT_COLLECTION;

fn scene() -> Scene {
    Scene::from_reader(
        r#"{
      "objects": [
        {"name": "CC_Base_Body", "shape_keys": ["JawOpen", "MouthSmile"]},
        {"name": "CC_Base_Teeth", "shape_keys": ["JawOpen"]},
        {"name": "Eyelash", "type": "CURVE"},
        {"name": "Rig", "type": "EMPTY", "children": ["Head", "Hair"]},
        {"name": "Head", "shape_keys": ["A"], "children": ["Hair"]},
        {"name": "Hair"},
        {"name": "grp_blendShapes_01", "type": "EMPTY", "children": ["Head"]}
      ],
      "collections": [
        {"name": "chars", "objects": ["Hair", "CC_Base_Body"], "children": ["inner"]},
        {"name": "inner", "objects": ["CC_Base_Body", "CC_Base_Teeth"]}
      ]
    }"#
        .as_bytes(),
    )
    .unwrap()
}

fn names(sel: TargetSelector) -> Vec<String> {
    resolve_targets(&scene(), &sel)
        .unwrap()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn name_list_skips_missing_and_non_mesh_objects() {
    let got = names(TargetSelector::default());
    assert_eq!(got, vec!["CC_Base_Body", "CC_Base_Teeth"]);
}

#[test]
fn duplicated_names_keep_first_seen_order() {
    let got = names(TargetSelector::Names(vec![
        "CC_Base_Teeth".into(),
        "CC_Base_Body".into(),
        "CC_Base_Teeth".into(),
    ]));
    assert_eq!(got, vec!["CC_Base_Teeth", "CC_Base_Body"]);
}

#[test]
fn collection_mode_prefers_an_object_of_that_name() {
    assert_eq!(
        names(TargetSelector::collection(DEFAULT_COLLECTION)),
        vec!["Head", "Hair"]
    );
}

#[test]
fn collection_mode_walks_nested_collections_once() {
    assert_eq!(
        names(TargetSelector::collection("chars")),
        vec!["Hair", "CC_Base_Body", "CC_Base_Teeth"]
    );
}

#[test]
fn object_root_includes_itself_when_it_is_a_mesh() {
    assert_eq!(names(TargetSelector::collection("Head")), vec!["Head", "Hair"]);
}

#[test]
fn unknown_group_is_a_configuration_error() {
    let err = resolve_targets(&scene(), &TargetSelector::collection("nope")).unwrap_err();
    assert!(matches!(err, FacecastError::Configuration(_)));
}

#[test]
fn nothing_resolved_is_no_targets() {
    let err = resolve_targets(&scene(), &TargetSelector::Names(vec!["Eyelash".into()]))
        .unwrap_err();
    assert!(matches!(err, FacecastError::NoTargets(_)));
}

#[test]
fn set_rejects_duplicate_names() {
    let mesh = |n: &str| TargetMesh {
        name: n.into(),
        controls: vec![],
    };
    let set: TargetControlSet = [mesh("a"), mesh("b"), mesh("a")].into_iter().collect();
    assert_eq!(set.names(), vec!["a", "b"]);
}
