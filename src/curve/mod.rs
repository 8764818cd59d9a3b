//! Time-coded blendshape curves and their CSV artifact form.

/// CSV artifact reading and incremental writing.
pub mod artifact;
/// In-memory curve model.
pub mod model;
