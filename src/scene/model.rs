use serde::{Deserialize, Serialize};

/// Object type string the render host uses for deformable meshes.
pub const MESH_TYPE: &str = "MESH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SceneDef {
    #[serde(default)]
    pub(crate) objects: Vec<ObjectDef>,
    #[serde(default)]
    pub(crate) collections: Vec<CollectionDef>,
    #[serde(default = "default_resolution")]
    pub(crate) resolution: [u32; 2],
}

fn default_resolution() -> [u32; 2] {
    [320, 180]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ObjectDef {
    pub(crate) name: String,
    #[serde(rename = "type", default = "default_object_type")]
    pub(crate) kind: String,
    /// Shape key names in host order.
    #[serde(default)]
    pub(crate) shape_keys: Vec<String>,
    /// Names of parented objects.
    #[serde(default)]
    pub(crate) children: Vec<String>,
}

fn default_object_type() -> String {
    MESH_TYPE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CollectionDef {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) objects: Vec<String>,
    /// Names of nested collections.
    #[serde(default)]
    pub(crate) children: Vec<String>,
}
