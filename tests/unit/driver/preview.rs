use super::*;
use crate::foundation::core::{Fps, FrameRange};

fn scene() -> Scene {
    Scene::from_reader(
        r#"{
      "resolution": [40, 20],
      "objects": [
        {"name": "Face", "shape_keys": ["A", "B"]},
        {"name": "Rig", "type": "EMPTY"}
      ]
    }"#
        .as_bytes(),
    )
    .unwrap()
}

fn settings(dir: &std::path::Path, end: u64) -> OutputSettings {
    OutputSettings {
        range: FrameRange::new(FrameIndex(0), FrameIndex(end)).unwrap(),
        fps: Fps::whole(30).unwrap(),
        frames_dir: dir.join("frames"),
        prefix: "render_frames_".into(),
    }
}

#[test]
fn keyframes_capture_the_current_value() {
    let mut host = PreviewHost::new(&scene());
    host.set_control("Face", "A", 0.1).unwrap();
    host.insert_keyframe("Face", "A", FrameIndex(0)).unwrap();
    host.set_control("Face", "A", 0.9).unwrap();
    host.insert_keyframe("Face", "A", FrameIndex(30)).unwrap();

    let track = host.track("Face", "A").unwrap();
    assert_eq!(track.keys().len(), 2);
    assert!((track.sample(FrameIndex(15)).unwrap() - 0.5).abs() < 1e-12);
    assert!(host.track("Face", "B").is_none());
}

#[test]
fn unknown_meshes_and_controls_are_rejected() {
    let mut host = PreviewHost::new(&scene());
    assert!(host.set_control("Nope", "A", 1.0).is_err());
    assert!(host.set_control("Face", "Z", 1.0).is_err());
    assert!(host.set_control("Rig", "A", 1.0).is_err());
}

#[test]
fn render_writes_one_png_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = PreviewHost::new(&scene());
    host.configure_output(&settings(dir.path(), 3)).unwrap();
    host.set_control("Face", "A", 1.0).unwrap();
    host.insert_keyframe("Face", "A", FrameIndex(0)).unwrap();

    assert_eq!(host.render_animation().unwrap(), 4);
    for f in 0..=3 {
        let p = dir.path().join(format!("frames/render_frames_{f:04}.png"));
        assert!(p.is_file(), "missing {}", p.display());
    }

    let img = image::open(dir.path().join("frames/render_frames_0000.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(img.dimensions(), (40, 20));
    // A single full-weight control fills its slot to the top.
    assert_eq!(img.get_pixel(20, 0).0, BAR);
    assert_eq!(img.get_pixel(0, 0).0, BACKGROUND);
}

#[test]
fn render_without_output_is_a_render_error() {
    let mut host = PreviewHost::new(&scene());
    let err = host.render_animation().unwrap_err();
    assert!(matches!(err, FacecastError::RenderProcess(_)));
}
