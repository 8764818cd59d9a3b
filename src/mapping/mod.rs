//! Curve-to-control mapping: target resolution and per-mesh channel matching.

/// Per-mesh channel matching.
pub mod channels;
/// Target selector and its positional-argument form.
pub mod selector;
/// Scene target resolution.
pub mod targets;
