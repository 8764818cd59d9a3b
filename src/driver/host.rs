use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::FacecastResult;

/// Where and over which window a host renders.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputSettings {
    pub range: FrameRange,
    pub fps: Fps,
    pub frames_dir: PathBuf,
    pub prefix: String,
}

impl OutputSettings {
    /// Path of the image for frame `f`.
    pub fn frame_path(&self, f: FrameIndex) -> PathBuf {
        self.frames_dir.join(frame_file_name(&self.prefix, f))
    }

    /// Encoder input pattern for the whole sequence.
    pub fn pattern(&self) -> PathBuf {
        frame_pattern(&self.frames_dir, &self.prefix)
    }
}

/// `<prefix><NNNN>.png`
pub fn frame_file_name(prefix: &str, f: FrameIndex) -> String {
    format!("{prefix}{:04}.png", f.0)
}

/// `<dir>/<prefix>%04d.png`
pub fn frame_pattern(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!("{prefix}%04d.png"))
}

/// The render host operations the keyframe driver needs.
///
/// Calls never suspend; the driver runs the whole keyframing loop synchronously inside the host.
pub trait RenderHost {
    /// Set the frame window, frame rate and image sequence destination.
    fn configure_output(&mut self, out: &OutputSettings) -> FacecastResult<()>;

    /// Set a control's current value.
    fn set_control(&mut self, mesh: &str, control: &str, value: f64) -> FacecastResult<()>;

    /// Record the control's current value as a keyframe at `frame`.
    fn insert_keyframe(&mut self, mesh: &str, control: &str, frame: FrameIndex)
    -> FacecastResult<()>;

    /// Render every frame of the configured window; returns the number of images written.
    fn render_animation(&mut self) -> FacecastResult<u64>;
}
