use super::*;

#[test]
fn args_follow_the_fixed_template() {
    let args: Vec<String> = mux_args(
        Path::new("/tmp/frames/render_frames_%04d.png"),
        Path::new("speech.wav"),
        Path::new("out/video.mp4"),
        Fps::whole(30).unwrap(),
    )
    .into_iter()
    .map(|a| a.to_string_lossy().into_owned())
    .collect();
    assert_eq!(
        args,
        vec![
            "-y",
            "-framerate",
            "30",
            "-i",
            "/tmp/frames/render_frames_%04d.png",
            "-i",
            "speech.wav",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
            "out/video.mp4",
        ]
    );
}

#[test]
fn fractional_rates_are_passed_as_ratios() {
    let args = mux_args(
        Path::new("p"),
        Path::new("a"),
        Path::new("o"),
        Fps::new(30000, 1001).unwrap(),
    );
    assert_eq!(args[2], "30000/1001");
}

#[test]
fn ensure_parent_dir_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a/b/video.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("video.mp4")).unwrap();
}

#[test]
fn missing_encoder_is_not_found() {
    let cfg = EncoderConfig {
        executable: Some("/no/such/ffmpeg".into()),
        ..EncoderConfig::default()
    };
    assert!(matches!(
        Muxer::from_config(&cfg),
        Err(FacecastError::ExecutableNotFound(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn failing_encoder_is_a_mux_error_with_output_tail() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = tempfile::tempdir().unwrap();
    let enc = dir.path().join("fake-ffmpeg");
    std::fs::write(&enc, "#!/bin/sh\necho \"Unknown encoder 'libx264'\" >&2\nexit 1\n").unwrap();
    std::fs::set_permissions(&enc, std::fs::Permissions::from_mode(0o755)).unwrap();

    let err = Muxer::new(&enc)
        .mux(
            Path::new("frames/f_%04d.png"),
            Path::new("a.wav"),
            &dir.path().join("out/video.mp4"),
            Fps::whole(30).unwrap(),
            &CancelSignal::never(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FacecastError::Mux(_)));
    assert!(err.to_string().contains("Unknown encoder"));
}

#[cfg(unix)]
#[tokio::test]
async fn successful_encoder_returns_the_output_path() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = tempfile::tempdir().unwrap();
    let enc = dir.path().join("fake-ffmpeg");
    // Writes its last argument, like the real encoder writes the output file.
    std::fs::write(&enc, "#!/bin/sh\nfor last; do :; done\necho video > \"$last\"\n").unwrap();
    std::fs::set_permissions(&enc, std::fs::Permissions::from_mode(0o755)).unwrap();

    let out = dir.path().join("nested/video.mp4");
    let got = Muxer::new(&enc)
        .mux(
            Path::new("f_%04d.png"),
            Path::new("a.wav"),
            &out,
            Fps::whole(30).unwrap(),
            &CancelSignal::never(),
        )
        .await
        .unwrap();
    assert_eq!(got, out);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "video\n");
}
