use super::*;

#[test]
fn no_arguments_select_the_default_names() {
    let sel = TargetSelector::from_args::<&str>(&[]).unwrap();
    assert_eq!(sel, TargetSelector::default());
    let TargetSelector::Names(names) = sel else {
        panic!("expected a name list");
    };
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "CC_Base_Body");
    assert_eq!(names[6], "CC_Base_Body.002");
}

#[test]
fn collection_keyword_is_case_insensitive_and_defaults_the_group() {
    assert_eq!(
        TargetSelector::from_args(&["Collection"]).unwrap(),
        TargetSelector::collection(DEFAULT_COLLECTION)
    );
    assert_eq!(
        TargetSelector::from_args(&["COLLECTION", "grp_face"]).unwrap(),
        TargetSelector::collection("grp_face")
    );
    assert!(TargetSelector::from_args(&["collection", "a", "b"]).is_err());
}

#[test]
fn other_arguments_are_comma_separated_names() {
    let sel = TargetSelector::from_args(&["Body, Teeth,,", "Tongue"]).unwrap();
    assert_eq!(
        sel,
        TargetSelector::Names(vec!["Body".into(), "Teeth".into(), "Tongue".into()])
    );
    assert!(TargetSelector::from_args(&[" , "]).is_err());
}

#[test]
fn to_args_parses_back_to_the_same_selector() {
    for sel in [
        TargetSelector::default(),
        TargetSelector::collection("grp_blendShapes_01"),
        TargetSelector::Names(vec!["Body".into(), "Teeth".into()]),
    ] {
        assert_eq!(TargetSelector::from_args(&sel.to_args()).unwrap(), sel);
    }
    assert!(TargetSelector::default().to_args().is_empty());
}
