use super::*;

#[test]
fn empty_json_yields_defaults() {
    let cfg = PipelineConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg.render.fps, 30);
    assert_eq!(cfg.render.frames_prefix, "render_frames_");
    assert_eq!(cfg.render.host_candidates, vec!["facecast-host", "facecast-host.exe"]);
    assert_eq!(cfg.render.script, None);
    assert_eq!(cfg.inference.channel_prefix, "blendShapes.");
    assert_eq!(cfg.speech.sample_rate, 24_000);
    cfg.validate().unwrap();
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let json = r#"{ "render": { "fps": 24, "frames_dir": "/tmp/x" }, "inference": { "chunk_samples": 1600 } }"#;
    let cfg = PipelineConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.render.fps, 24);
    assert_eq!(cfg.render.frames_dir, PathBuf::from("/tmp/x"));
    assert_eq!(cfg.render.frames_prefix, "render_frames_");
    assert_eq!(cfg.inference.chunk_samples, Some(1600));
}

#[test]
fn environment_overrides_credentials() {
    let mut cfg = PipelineConfig::default();
    cfg.apply_env_from(|key| match key {
        ENV_INFERENCE_API_KEY => Some("nvapi-test".to_string()),
        ENV_INFERENCE_FUNCTION_ID => Some("fn-1".to_string()),
        ENV_TTS_URL => Some("   ".to_string()),
        _ => None,
    });
    assert_eq!(cfg.inference.api_key.as_deref(), Some("nvapi-test"));
    assert_eq!(cfg.inference.function_id.as_deref(), Some("fn-1"));
    assert_eq!(cfg.speech.base_url, SpeechConfig::default().base_url);
}

#[test]
fn builtin_presets_split_named_and_collection_rigs() {
    let cfg = PipelineConfig::default();
    let belinda = cfg.preset("belinda").unwrap();
    assert!(belinda.selector.is_empty());
    let broom = cfg.preset("broom_salesman").unwrap();
    assert_eq!(broom.selector, vec!["collection", "grp_blendShapes_01"]);
    assert!(matches!(
        cfg.preset("nobody"),
        Err(FacecastError::Configuration(_))
    ));
}

#[test]
fn configured_presets_replace_builtins() {
    let json = r#"{ "presets": { "robot": { "scene": "robot.json", "selector": ["Face"] } } }"#;
    let cfg = PipelineConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.preset("robot").unwrap().selector, vec!["Face"]);
    assert!(cfg.preset("belinda").is_err());
}

#[test]
fn validation_rejects_unusable_values() {
    let mut cfg = PipelineConfig::default();
    cfg.render.fps = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::default();
    cfg.render.frames_prefix = "a/b".to_string();
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::default();
    cfg.inference.chunk_samples = Some(0);
    assert!(cfg.validate().is_err());
}
