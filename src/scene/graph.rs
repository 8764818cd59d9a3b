use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{FacecastError, FacecastResult};
use crate::scene::model::{MESH_TYPE, SceneDef};

/// What a node can do for the animation mapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Deformable object exposing named controls.
    Mesh,
    /// Anything that only groups other nodes: collections and non-mesh objects.
    Group,
}

/// Capability view of a scene node.
pub trait RenderableNode: Sized {
    fn name(&self) -> &str;
    fn kind(&self) -> NodeKind;
    /// Named controls (shape keys); empty for groups.
    fn controls(&self) -> &[String];
    fn children(&self) -> Vec<Self>;
}

/// A scene object.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub name: String,
    /// Host object type (`MESH`, `EMPTY`, `ARMATURE`, ...).
    pub object_type: String,
    pub controls: Vec<String>,
    pub children: Vec<String>,
}

impl SceneObject {
    pub fn is_mesh(&self) -> bool {
        self.object_type.eq_ignore_ascii_case(MESH_TYPE)
    }
}

/// A named grouping of objects and nested collections.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection {
    pub name: String,
    pub objects: Vec<String>,
    pub children: Vec<String>,
}

/// Validated scene graph.
///
/// Every object and collection reference resolves; cycles are allowed and handled by traversal.
#[derive(Clone, Debug)]
pub struct Scene {
    objects: BTreeMap<String, SceneObject>,
    collections: BTreeMap<String, Collection>,
    resolution: (u32, u32),
}

impl Scene {
    /// Parse and validate a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FacecastResult<Self> {
        let def: SceneDef = serde_json::from_reader(r)
            .map_err(|e| FacecastError::configuration(format!("parse scene JSON: {e}")))?;
        Self::from_def(def)
    }

    /// Parse and validate a scene file.
    pub fn from_path(path: impl AsRef<Path>) -> FacecastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FacecastError::configuration(format!("open scene '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub(crate) fn from_def(def: SceneDef) -> FacecastResult<Self> {
        let [w, h] = def.resolution;
        if w == 0 || h == 0 {
            return Err(FacecastError::configuration(
                "scene resolution must be non-zero",
            ));
        }

        let mut objects = BTreeMap::new();
        for o in def.objects {
            if o.name.is_empty() {
                return Err(FacecastError::configuration("scene object without a name"));
            }
            let obj = SceneObject {
                name: o.name.clone(),
                object_type: o.kind,
                controls: o.shape_keys,
                children: o.children,
            };
            if objects.insert(o.name.clone(), obj).is_some() {
                return Err(FacecastError::configuration(format!(
                    "duplicate scene object '{}'",
                    o.name
                )));
            }
        }

        let mut collections = BTreeMap::new();
        for c in def.collections {
            if c.name.is_empty() {
                return Err(FacecastError::configuration(
                    "scene collection without a name",
                ));
            }
            let coll = Collection {
                name: c.name.clone(),
                objects: c.objects,
                children: c.children,
            };
            if collections.insert(c.name.clone(), coll).is_some() {
                return Err(FacecastError::configuration(format!(
                    "duplicate scene collection '{}'",
                    c.name
                )));
            }
        }

        let scene = Self {
            objects,
            collections,
            resolution: (w, h),
        };
        scene.check_references()?;
        Ok(scene)
    }

    fn check_references(&self) -> FacecastResult<()> {
        let missing_object = |owner: &str, name: &str| {
            FacecastError::configuration(format!("'{owner}' references unknown object '{name}'"))
        };
        for o in self.objects.values() {
            if let Some(c) = o.children.iter().find(|c| !self.objects.contains_key(*c)) {
                return Err(missing_object(&o.name, c));
            }
        }
        for coll in self.collections.values() {
            if let Some(c) = coll.objects.iter().find(|c| !self.objects.contains_key(*c)) {
                return Err(missing_object(&coll.name, c));
            }
            if let Some(c) = coll
                .children
                .iter()
                .find(|c| !self.collections.contains_key(*c))
            {
                return Err(FacecastError::configuration(format!(
                    "'{}' references unknown collection '{c}'",
                    coll.name
                )));
            }
        }
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    /// Object names in lexical order.
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Output image size `(width, height)` in pixels.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Node view of an object.
    pub fn object_node(&self, name: &str) -> Option<NodeRef<'_>> {
        self.objects.get(name).map(|o| NodeRef {
            scene: self,
            target: Target::Object(o),
        })
    }

    /// Node view of a collection.
    pub fn collection_node(&self, name: &str) -> Option<NodeRef<'_>> {
        self.collections.get(name).map(|c| NodeRef {
            scene: self,
            target: Target::Collection(c),
        })
    }
}

#[derive(Clone, Copy, Debug)]
enum Target<'s> {
    Object(&'s SceneObject),
    Collection(&'s Collection),
}

/// Borrowed handle to one node of a [`Scene`].
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'s> {
    scene: &'s Scene,
    target: Target<'s>,
}

impl<'s> NodeRef<'s> {
    /// The underlying object, unless this node is a collection.
    pub fn as_object(&self) -> Option<&'s SceneObject> {
        match self.target {
            Target::Object(o) => Some(o),
            Target::Collection(_) => None,
        }
    }

    fn key(&self) -> (bool, &'s str) {
        match self.target {
            Target::Object(o) => (false, o.name.as_str()),
            Target::Collection(c) => (true, c.name.as_str()),
        }
    }
}

impl RenderableNode for NodeRef<'_> {
    fn name(&self) -> &str {
        self.key().1
    }

    fn kind(&self) -> NodeKind {
        match self.target {
            Target::Object(o) if o.is_mesh() => NodeKind::Mesh,
            _ => NodeKind::Group,
        }
    }

    fn controls(&self) -> &[String] {
        match self.target {
            Target::Object(o) if o.is_mesh() => &o.controls,
            _ => &[],
        }
    }

    /// Objects list their parented objects; collections list member objects, then nested
    /// collections.
    fn children(&self) -> Vec<Self> {
        match self.target {
            Target::Object(o) => o
                .children
                .iter()
                .filter_map(|n| self.scene.object_node(n))
                .collect(),
            Target::Collection(c) => c
                .objects
                .iter()
                .filter_map(|n| self.scene.object_node(n))
                .chain(c.children.iter().filter_map(|n| self.scene.collection_node(n)))
                .collect(),
        }
    }
}

/// Every node strictly below `root`, depth-first in child order.
///
/// Uses an explicit worklist and a visited set, so shared children and cycles are visited once.
pub fn descendants<'s>(root: NodeRef<'s>) -> Vec<NodeRef<'s>> {
    let mut out = Vec::new();
    let mut visited: HashSet<(bool, &'s str)> = HashSet::new();
    visited.insert(root.key());

    let mut stack: Vec<NodeRef<'s>> = root.children().into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if !visited.insert(node.key()) {
            continue;
        }
        stack.extend(node.children().into_iter().rev());
        out.push(node);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
