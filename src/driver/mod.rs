//! Keyframe driver: applies mapped curve weights to host controls and triggers the render.

/// Curve-to-keyframe loop.
pub mod drive;
/// Render host seam and frame naming.
pub mod host;
/// In-process host writing preview images.
pub mod preview;
/// Per-control keyframe tracks.
pub mod track;
