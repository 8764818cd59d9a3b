use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FacecastError::connection("x")
            .to_string()
            .contains("connection error:")
    );
    assert!(
        FacecastError::no_mapped_channels("x")
            .to_string()
            .contains("no mapped channels:")
    );
    assert!(
        FacecastError::render_process("x")
            .to_string()
            .contains("render process failed:")
    );
    assert!(FacecastError::mux("x").to_string().contains("mux failed:"));
}

#[test]
fn stages_follow_the_failure_taxonomy() {
    assert_eq!(FacecastError::stream("x").stage(), Stage::Inference);
    assert_eq!(FacecastError::malformed("x").stage(), Stage::Inference);
    assert_eq!(FacecastError::empty_curve("x").stage(), Stage::Mapping);
    assert_eq!(FacecastError::no_targets("x").stage(), Stage::Mapping);
    assert_eq!(FacecastError::render_process("x").stage(), Stage::Render);
    assert_eq!(FacecastError::mux("x").stage(), Stage::Mux);
    assert!(FacecastError::cancelled("x").is_cancelled());
    assert!(!FacecastError::mux("x").is_cancelled());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FacecastError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn message_drops_the_kind_prefix() {
    assert_eq!(
        FacecastError::no_mapped_channels("no column matches").message(),
        "no column matches"
    );
    let other = FacecastError::from(anyhow::anyhow!("disk full").context("write frame"));
    assert_eq!(other.message(), "write frame: disk full");
}
