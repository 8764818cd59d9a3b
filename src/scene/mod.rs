//! Scene description standing in for the render host's scene graph.

/// Validated scene graph and its [`graph::RenderableNode`] view.
pub mod graph;
/// JSON boundary types.
pub mod model;
