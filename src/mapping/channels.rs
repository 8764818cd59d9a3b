use std::collections::HashSet;

use crate::curve::model::{AnimationCurve, local_control_name};
use crate::foundation::error::{FacecastError, FacecastResult};
use crate::mapping::targets::{TargetControlSet, animatable};

/// One curve column bound to one mesh control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedChannel {
    /// Index into the curve's channels and each frame's weights.
    pub column: usize,
    /// Namespaced curve channel name.
    pub channel: String,
    /// Local control name on the mesh.
    pub control: String,
}

/// Channels driving one mesh; never empty once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshMapping {
    pub mesh: String,
    pub channels: Vec<MappedChannel>,
}

/// Per-mesh channel mappings for a job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelMapping {
    meshes: Vec<MeshMapping>,
}

impl ChannelMapping {
    pub fn meshes(&self) -> &[MeshMapping] {
        &self.meshes
    }

    /// Total (mesh, channel) pairs.
    pub fn total_channels(&self) -> usize {
        self.meshes.iter().map(|m| m.channels.len()).sum()
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshMapping> {
        self.meshes.iter().find(|m| m.mesh == name)
    }
}

/// Match curve channels to each target mesh's controls.
///
/// A channel maps to a mesh when its name, stripped of `prefix`, is one of the mesh's controls.
/// Meshes are matched independently; a mesh that matches nothing is dropped with a warning.
pub fn build_mapping(
    curve: &AnimationCurve,
    targets: &TargetControlSet,
    prefix: &str,
) -> FacecastResult<ChannelMapping> {
    if targets.is_empty() {
        return Err(FacecastError::no_targets("target set is empty"));
    }
    let meshes = animatable(targets);
    if meshes.is_empty() {
        return Err(FacecastError::no_animatable_targets(
            "none of the target meshes have shape keys, nothing to animate",
        ));
    }

    let mut out = ChannelMapping::default();
    for mesh in meshes {
        let controls: HashSet<&str> = mesh.controls.iter().map(String::as_str).collect();
        let channels: Vec<MappedChannel> = curve
            .channels()
            .iter()
            .enumerate()
            .filter_map(|(column, channel)| {
                let control = local_control_name(channel, prefix);
                controls.contains(control).then(|| MappedChannel {
                    column,
                    channel: channel.clone(),
                    control: control.to_string(),
                })
            })
            .collect();

        tracing::info!(mesh = %mesh.name, matched = channels.len(), "channel mapping");
        if channels.is_empty() {
            tracing::warn!(mesh = %mesh.name, "no curve channel matches this mesh, skipping");
            continue;
        }
        out.meshes.push(MeshMapping {
            mesh: mesh.name.clone(),
            channels,
        });
    }

    if out.meshes.is_empty() {
        return Err(FacecastError::no_mapped_channels(format!(
            "none of {} curve channels match a shape key on the target meshes",
            curve.channels().len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/channels.rs"]
mod tests;
