use std::collections::BTreeMap;

use crate::driver::host::{OutputSettings, RenderHost};
use crate::driver::track::ControlTrack;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FacecastError, FacecastResult};
use crate::scene::graph::{NodeKind, RenderableNode, Scene};

const BACKGROUND: [u8; 4] = [24, 24, 28, 255];
const BAR: [u8; 4] = [90, 200, 140, 255];
const TRACK_BG: [u8; 4] = [48, 48, 56, 255];

type ControlId = (String, String);

/// Render host that keys controls in memory and renders one weight bar chart per frame.
///
/// Knows every mesh control of its scene. Controls that were never keyed are not drawn.
#[derive(Debug)]
pub struct PreviewHost {
    size: (u32, u32),
    known: BTreeMap<String, Vec<String>>,
    current: BTreeMap<ControlId, f64>,
    tracks: BTreeMap<ControlId, ControlTrack>,
    output: Option<OutputSettings>,
}

impl PreviewHost {
    pub fn new(scene: &Scene) -> Self {
        let known = scene
            .object_names()
            .filter_map(|name| scene.object_node(name))
            .filter(|node| node.kind() == NodeKind::Mesh)
            .map(|node| (node.name().to_string(), node.controls().to_vec()))
            .collect();
        Self {
            size: scene.resolution(),
            known,
            current: BTreeMap::new(),
            tracks: BTreeMap::new(),
            output: None,
        }
    }

    /// Keyframe track of a control, if it was keyed.
    pub fn track(&self, mesh: &str, control: &str) -> Option<&ControlTrack> {
        self.tracks.get(&(mesh.to_string(), control.to_string()))
    }

    /// Output settings from the last `configure_output`.
    pub fn output(&self) -> Option<&OutputSettings> {
        self.output.as_ref()
    }

    fn control_id(&self, mesh: &str, control: &str) -> FacecastResult<ControlId> {
        let controls = self.known.get(mesh).ok_or_else(|| {
            FacecastError::configuration(format!("mesh object '{mesh}' not found in scene"))
        })?;
        if !controls.iter().any(|c| c == control) {
            return Err(FacecastError::configuration(format!(
                "mesh '{mesh}' has no shape key '{control}'"
            )));
        }
        Ok((mesh.to_string(), control.to_string()))
    }

    fn draw(&self, f: FrameIndex) -> Vec<u8> {
        let (w, h) = self.size;
        let mut px = Vec::with_capacity(w as usize * h as usize * 4);
        for _ in 0..(w as usize * h as usize) {
            px.extend_from_slice(&BACKGROUND);
        }

        let n = self.tracks.len() as u32;
        if n == 0 {
            return px;
        }
        let slot = (w / n).max(1);
        let pad = slot / 6;
        for (i, track) in self.tracks.values().enumerate() {
            let value = track.sample(f).unwrap_or(0.0).clamp(0.0, 1.0);
            let x0 = i as u32 * slot + pad;
            let x1 = ((i as u32 + 1) * slot).saturating_sub(pad).min(w);
            let filled = (value * f64::from(h)).round() as u32;
            for x in x0..x1 {
                for y in 0..h {
                    let color = if h - y <= filled { BAR } else { TRACK_BG };
                    let at = (y as usize * w as usize + x as usize) * 4;
                    px[at..at + 4].copy_from_slice(&color);
                }
            }
        }
        px
    }
}

impl RenderHost for PreviewHost {
    fn configure_output(&mut self, out: &OutputSettings) -> FacecastResult<()> {
        if out.prefix.is_empty() {
            return Err(FacecastError::configuration("frames prefix must not be empty"));
        }
        self.output = Some(out.clone());
        Ok(())
    }

    fn set_control(&mut self, mesh: &str, control: &str, value: f64) -> FacecastResult<()> {
        let id = self.control_id(mesh, control)?;
        self.current.insert(id, value);
        Ok(())
    }

    fn insert_keyframe(
        &mut self,
        mesh: &str,
        control: &str,
        frame: FrameIndex,
    ) -> FacecastResult<()> {
        let id = self.control_id(mesh, control)?;
        let value = self.current.get(&id).copied().unwrap_or(0.0);
        self.tracks.entry(id).or_default().insert(frame, value);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn render_animation(&mut self) -> FacecastResult<u64> {
        let out = self
            .output
            .clone()
            .ok_or_else(|| FacecastError::render_process("render output was never configured"))?;
        std::fs::create_dir_all(&out.frames_dir).map_err(|e| {
            FacecastError::render_process(format!(
                "create frames dir '{}': {e}",
                out.frames_dir.display()
            ))
        })?;

        let (w, h) = self.size;
        let mut written = 0u64;
        for f in out.range.iter() {
            let path = out.frame_path(f);
            image::save_buffer_with_format(
                &path,
                &self.draw(f),
                w,
                h,
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .map_err(|e| {
                FacecastError::render_process(format!("write frame '{}': {e}", path.display()))
            })?;
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/preview.rs"]
mod tests;
