use crate::foundation::error::{FacecastError, FacecastResult};
use crate::mapping::selector::TargetSelector;
use crate::scene::graph::{NodeKind, NodeRef, RenderableNode, Scene, descendants};

/// One resolved mesh and the controls it exposes.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetMesh {
    pub name: String,
    pub controls: Vec<String>,
}

impl TargetMesh {
    fn from_node(node: &NodeRef<'_>) -> Self {
        Self {
            name: node.name().to_string(),
            controls: node.controls().to_vec(),
        }
    }
}

/// Resolved target meshes, unique by name, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetControlSet {
    meshes: Vec<TargetMesh>,
}

impl TargetControlSet {
    /// Add a mesh unless one with the same name is already present.
    ///
    /// Returns `true` when the mesh was added.
    pub fn insert(&mut self, mesh: TargetMesh) -> bool {
        if self.meshes.iter().any(|m| m.name == mesh.name) {
            return false;
        }
        self.meshes.push(mesh);
        true
    }

    pub fn meshes(&self) -> &[TargetMesh] {
        &self.meshes
    }

    pub fn names(&self) -> Vec<&str> {
        self.meshes.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl FromIterator<TargetMesh> for TargetControlSet {
    fn from_iter<I: IntoIterator<Item = TargetMesh>>(iter: I) -> Self {
        let mut set = Self::default();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

/// Resolve the meshes a selector names in `scene`.
///
/// Name lists warn about and skip unknown or non-mesh objects. Collection mode prefers an object
/// with the group name (itself if it is a mesh, then every mesh below it) and falls back to a
/// collection of that name. An empty result is [`FacecastError::NoTargets`].
#[tracing::instrument(skip(scene), fields(selector = %selector))]
pub fn resolve_targets(scene: &Scene, selector: &TargetSelector) -> FacecastResult<TargetControlSet> {
    let mut set = TargetControlSet::default();
    match selector {
        TargetSelector::Names(names) => {
            for name in names {
                match scene.object_node(name) {
                    None => tracing::warn!(object = %name, "target object not found, skipping"),
                    Some(node) if node.kind() != NodeKind::Mesh => {
                        tracing::warn!(object = %name, "target object is not a mesh, skipping");
                    }
                    Some(node) => {
                        if !set.insert(TargetMesh::from_node(&node)) {
                            tracing::debug!(object = %name, "duplicate target ignored");
                        }
                    }
                }
            }
        }
        TargetSelector::Collection(group) => {
            let root = match (scene.object_node(group), scene.collection_node(group)) {
                (Some(obj), _) => obj,
                (None, Some(coll)) => coll,
                (None, None) => {
                    return Err(FacecastError::configuration(format!(
                        "neither object nor collection named '{group}' found in scene"
                    )));
                }
            };
            let meshes = std::iter::once(root)
                .chain(descendants(root))
                .filter(|n| n.kind() == NodeKind::Mesh);
            for node in meshes {
                set.insert(TargetMesh::from_node(&node));
            }
        }
    }

    if set.is_empty() {
        return Err(FacecastError::no_targets(format!(
            "no mesh objects found for {selector}"
        )));
    }
    tracing::info!(meshes = ?set.names(), "resolved target meshes");
    Ok(set)
}

/// Meshes with at least one control; warns about the rest.
pub(crate) fn animatable(targets: &TargetControlSet) -> Vec<&TargetMesh> {
    targets
        .meshes()
        .iter()
        .filter(|m| {
            if m.controls.is_empty() {
                tracing::warn!(mesh = %m.name, "mesh has no shape keys, skipping");
                false
            } else {
                true
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/targets.rs"]
mod tests;
