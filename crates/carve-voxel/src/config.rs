use std::collections::HashMap;

use serde::Deserialize;

/// Root of a `types.toml` document used for bulk registry reloads.
#[derive(Debug, Default, Deserialize)]
pub struct TypesConfig {
    #[serde(default)]
    pub types: Vec<TypeConfig>,
}

/// Unresolved voxel type definition as authored in TOML. Face textures are
/// image paths; the registry turns them into atlas slice indices.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TypeConfig {
    pub name: String,
    #[serde(default = "default_base_color")]
    pub base_color: [u8; 4],
    /// Default texture for faces without an explicit entry.
    pub texture: Option<String>,
    /// Keys: `pos_x..neg_z` for single faces, or the roles
    /// `all`/`top`/`bottom`/`side`. Exact face keys win over roles.
    #[serde(default)]
    pub faces: HashMap<String, FaceTexConfig>,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub paintable: bool,
}

fn default_base_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum FaceTexConfig {
    // face = "assets/foo.png"
    Path(String),
    // face = { path = "...", variation_chance = 25, variations = ["..."] }
    Detail {
        path: String,
        #[serde(default)]
        variation_chance: u8,
        #[serde(default)]
        variations: Vec<String>,
    },
}

impl FaceTexConfig {
    pub fn path(&self) -> &str {
        match self {
            FaceTexConfig::Path(p) => p,
            FaceTexConfig::Detail { path, .. } => path,
        }
    }
}

/// Face indices covered by a `faces` table key, in the fixed
/// `+X,-X,+Y,-Y,+Z,-Z` order. Returns an empty slice for unknown keys.
pub fn face_indices_for_key(key: &str) -> &'static [usize] {
    match key {
        "pos_x" => &[0],
        "neg_x" => &[1],
        "pos_y" => &[2],
        "neg_y" => &[3],
        "pos_z" => &[4],
        "neg_z" => &[5],
        "top" => &[2],
        "bottom" => &[3],
        "side" => &[0, 1, 4, 5],
        "all" => &[0, 1, 2, 3, 4, 5],
        _ => &[],
    }
}

/// Application order for `faces` table keys: broad roles first so exact
/// face keys override them. Unknown keys sort last and are skipped anyway.
pub fn face_key_rank(key: &str) -> u8 {
    match key {
        "all" => 0,
        "top" | "bottom" | "side" => 1,
        "pos_x" | "neg_x" | "pos_y" | "neg_y" | "pos_z" | "neg_z" => 2,
        _ => 3,
    }
}
