use crate::foundation::error::{FacecastError, FacecastResult};

/// Mesh objects a character rig exposes its facial controls on.
pub const DEFAULT_OBJECT_NAMES: &[&str] = &[
    "CC_Base_Body",
    "CC_Base_Eye",
    "CC_Base_EyeOcclusion",
    "CC_Base_Teeth",
    "CC_Base_Tongue",
    "Eyelash",
    "CC_Base_Body.002",
];

/// Group enumerated when collection mode names none.
pub const DEFAULT_COLLECTION: &str = "grp_blendShapes_01";

/// Keyword switching the positional selector into collection mode.
pub const COLLECTION_KEYWORD: &str = "collection";

/// How target meshes are picked from a scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetSelector {
    /// Exact object names.
    Names(Vec<String>),
    /// Every mesh under an object or collection with this name.
    Collection(String),
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::Names(DEFAULT_OBJECT_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

impl TargetSelector {
    pub fn collection(name: impl Into<String>) -> Self {
        Self::Collection(name.into())
    }

    /// Parse the selector arguments that follow `<fps>` on the render-host command line.
    ///
    /// No arguments selects the default names; `collection [group]` selects collection mode;
    /// anything else is a comma-separated name list.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> FacecastResult<Self> {
        let Some(first) = args.first() else {
            return Ok(Self::default());
        };
        if first.as_ref().trim().eq_ignore_ascii_case(COLLECTION_KEYWORD) {
            if args.len() > 2 {
                return Err(FacecastError::configuration(format!(
                    "collection selector takes one group name, got {}",
                    args.len() - 1
                )));
            }
            let group = args
                .get(1)
                .map(|g| g.as_ref().trim())
                .filter(|g| !g.is_empty())
                .unwrap_or(DEFAULT_COLLECTION);
            return Ok(Self::Collection(group.to_string()));
        }

        let names: Vec<String> = args
            .iter()
            .flat_map(|a| a.as_ref().split(','))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(FacecastError::configuration("empty object name list"));
        }
        Ok(Self::Names(names))
    }

    /// Inverse of [`TargetSelector::from_args`]; the default selector has no arguments.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            _ if *self == Self::default() => Vec::new(),
            Self::Names(names) => vec![names.join(",")],
            Self::Collection(group) => vec![COLLECTION_KEYWORD.to_string(), group.clone()],
        }
    }
}

impl std::fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Names(names) => write!(f, "names [{}]", names.join(", ")),
            Self::Collection(group) => write!(f, "collection '{group}'"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/selector.rs"]
mod tests;
