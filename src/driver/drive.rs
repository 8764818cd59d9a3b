use std::path::PathBuf;

use crate::curve::model::AnimationCurve;
use crate::driver::host::{OutputSettings, RenderHost};
use crate::foundation::core::{Fps, FrameRange};
use crate::foundation::error::FacecastResult;
use crate::mapping::channels::build_mapping;
use crate::mapping::targets::TargetControlSet;

/// Rows between progress log lines.
pub const PROGRESS_EVERY_ROWS: usize = 200;

/// Everything the driver needs for one render.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub curve: AnimationCurve,
    pub targets: TargetControlSet,
    pub range: FrameRange,
    pub fps: Fps,
    pub frames_dir: PathBuf,
    pub frames_prefix: String,
    /// Namespace prefix stripped from curve channel names.
    pub channel_prefix: String,
}

impl RenderJob {
    /// Build a job, computing the frame window from the curve.
    ///
    /// Fails with [`crate::FacecastError::EmptyCurve`] for a curve the driver cannot animate.
    pub fn new(
        curve: AnimationCurve,
        targets: TargetControlSet,
        fps: Fps,
        frames_dir: impl Into<PathBuf>,
        frames_prefix: impl Into<String>,
        channel_prefix: impl Into<String>,
    ) -> FacecastResult<Self> {
        curve.ensure_animatable()?;
        let range = curve.frame_range(fps)?;
        Ok(Self {
            curve,
            targets,
            range,
            fps,
            frames_dir: frames_dir.into(),
            frames_prefix: frames_prefix.into(),
            channel_prefix: channel_prefix.into(),
        })
    }

    pub fn output(&self) -> OutputSettings {
        OutputSettings {
            range: self.range,
            fps: self.fps,
            frames_dir: self.frames_dir.clone(),
            prefix: self.frames_prefix.clone(),
        }
    }
}

/// What one [`drive`] call did.
#[derive(Clone, Debug, PartialEq)]
pub struct DriveReport {
    pub range: FrameRange,
    pub rows: usize,
    pub keyframes: u64,
    /// Meshes with at least one mapped channel.
    pub meshes: Vec<String>,
    pub frames_rendered: u64,
}

/// Key every mapped control from the curve and render the frame window once.
///
/// Rows are consumed in order; each lands on `round(time_code * fps)` clamped into the window.
/// Missing weights key `0.0`.
#[tracing::instrument(skip_all, fields(rows = job.curve.len(), fps = %job.fps))]
pub fn drive(job: &RenderJob, host: &mut dyn RenderHost) -> FacecastResult<DriveReport> {
    job.curve.ensure_animatable()?;
    let mapping = build_mapping(&job.curve, &job.targets, &job.channel_prefix)?;

    let out = job.output();
    host.configure_output(&out)?;
    tracing::info!(start = out.range.start.0, end = out.range.end.0, "frame range");

    let mut keyframes = 0u64;
    for (row, frame) in job.curve.frames().iter().enumerate() {
        let f = job.range.clamp(job.fps.secs_to_frame_round(frame.time_code));
        for mesh in mapping.meshes() {
            for ch in &mesh.channels {
                host.set_control(&mesh.mesh, &ch.control, frame.weight_or_zero(ch.column))?;
                host.insert_keyframe(&mesh.mesh, &ch.control, f)?;
                keyframes += 1;
            }
        }
        if (row + 1) % PROGRESS_EVERY_ROWS == 0 {
            tracing::info!(rows = row + 1, "processed rows");
        }
    }
    tracing::info!(keyframes, "all keyframes inserted");

    let frames_rendered = host.render_animation()?;
    tracing::info!(frames = frames_rendered, dir = %out.frames_dir.display(), "rendering complete");

    Ok(DriveReport {
        range: job.range,
        rows: job.curve.len(),
        keyframes,
        meshes: mapping.meshes().iter().map(|m| m.mesh.clone()).collect(),
        frames_rendered,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/driver/drive.rs"]
mod tests;
