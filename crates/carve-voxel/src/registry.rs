use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;

use crate::atlas::TextureAtlas;
use crate::config::{FaceTexConfig, TypeConfig, TypesConfig, face_indices_for_key, face_key_rank};
use crate::palette::MeshPalette;
use crate::types::{FACE_COUNT, FaceTex, TypeDef, TypeId};

/// Notification sent to subscribers after every structural registry change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    Changed,
}

/// Owned registry mapping type ids to compiled definitions.
///
/// Slot 0 is always the built-in "air" definition. Ids are assigned
/// sequentially above the current maximum and are never reused after an
/// unregister, so stale ids in live chunk data stay distinguishable.
pub struct TypeRegistry {
    defs: Vec<Option<TypeDef>>,
    by_name: HashMap<String, TypeId>,
    subscribers: Vec<Sender<RegistryEvent>>,
    palette: Arc<MeshPalette>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let defs = vec![Some(TypeDef::air())];
        let palette = Arc::new(MeshPalette::from_defs(&defs));
        let mut by_name = HashMap::new();
        by_name.insert("air".to_string(), 0);
        Self {
            defs,
            by_name,
            subscribers: Vec::new(),
            palette,
        }
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.defs.get(id as usize).and_then(|d| d.as_ref())
    }

    pub fn id_by_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Number of live definitions (holes from unregister excluded).
    pub fn len(&self) -> usize {
        self.defs.iter().filter(|d| d.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> impl Iterator<Item = &TypeDef> {
        self.defs.iter().filter_map(|d| d.as_ref())
    }

    /// Registers a definition. Returns the existing id when the name is
    /// already present; `None` when the name is empty, the id space is
    /// exhausted, or texture resolution fails.
    pub fn register(&mut self, cfg: TypeConfig, atlas: &mut dyn TextureAtlas) -> Option<TypeId> {
        if cfg.name.is_empty() {
            log::warn!("rejecting type registration with empty name");
            return None;
        }
        if let Some(id) = self.by_name.get(&cfg.name) {
            return Some(*id);
        }
        if self.defs.len() > TypeId::MAX as usize {
            log::warn!("type id space exhausted; cannot register '{}'", cfg.name);
            return None;
        }
        let id = self.defs.len() as TypeId;
        let def = self.compile(cfg, id, atlas)?;
        self.by_name.insert(def.name.clone(), id);
        self.defs.push(Some(def));
        self.rebuild_and_notify();
        Some(id)
    }

    /// Registers a definition under an explicit id (used for fixed ids such
    /// as 0/"air" in hand-built registries). Fails on any id or name
    /// collision.
    pub fn register_with_id(
        &mut self,
        cfg: TypeConfig,
        id: TypeId,
        atlas: &mut dyn TextureAtlas,
    ) -> Option<TypeId> {
        if cfg.name.is_empty() {
            log::warn!("rejecting type registration with empty name");
            return None;
        }
        if self.by_name.contains_key(&cfg.name) {
            log::warn!("type name '{}' already registered", cfg.name);
            return None;
        }
        if self.defs.get(id as usize).is_some_and(|d| d.is_some()) {
            log::warn!("type id {} already occupied", id);
            return None;
        }
        let def = self.compile(cfg, id, atlas)?;
        if self.defs.len() <= id as usize {
            self.defs.resize(id as usize + 1, None);
        }
        self.by_name.insert(def.name.clone(), id);
        self.defs[id as usize] = Some(def);
        self.rebuild_and_notify();
        Some(id)
    }

    /// Clears a slot. Fails for the fixed air slot and for ids that are
    /// unknown or already empty.
    pub fn unregister(&mut self, id: TypeId) -> bool {
        if id == 0 {
            log::warn!("refusing to unregister the fixed air definition");
            return false;
        }
        let Some(slot) = self.defs.get_mut(id as usize) else {
            return false;
        };
        let Some(def) = slot.take() else {
            return false;
        };
        self.by_name.remove(&def.name);
        self.rebuild_and_notify();
        true
    }

    /// Drops every definition and re-seeds the fixed air slot. Used before a
    /// bulk reload.
    pub fn clear(&mut self) {
        self.defs.clear();
        self.defs.push(Some(TypeDef::air()));
        self.by_name.clear();
        self.by_name.insert("air".to_string(), 0);
        self.rebuild_and_notify();
    }

    /// Bulk reload from a `types.toml` document: clears the registry, then
    /// registers every entry. Entries that fail to resolve are logged and
    /// skipped. Returns the number of registered entries.
    pub fn load_from_toml_str(
        &mut self,
        toml_str: &str,
        atlas: &mut dyn TextureAtlas,
    ) -> Result<usize, Box<dyn Error>> {
        let cfg: TypesConfig = toml::from_str(toml_str)?;
        self.clear();
        let mut count = 0usize;
        for ty in cfg.types {
            let name = ty.name.clone();
            if self.register(ty, atlas).is_some() {
                count += 1;
            } else {
                log::warn!("skipping type '{}' during bulk reload", name);
            }
        }
        Ok(count)
    }

    pub fn load_from_path(
        &mut self,
        path: impl AsRef<Path>,
        atlas: &mut dyn TextureAtlas,
    ) -> Result<usize, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        self.load_from_toml_str(&s, atlas)
    }

    /// Subscribes to change notifications. The receiver stays valid for the
    /// subscriber's lifetime; dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> Receiver<RegistryEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Compiled snapshot for the mesher; cheap to clone into jobs.
    pub fn mesh_palette(&self) -> Arc<MeshPalette> {
        Arc::clone(&self.palette)
    }

    fn rebuild_and_notify(&mut self) {
        self.palette = Arc::new(MeshPalette::from_defs(&self.defs));
        self.subscribers
            .retain(|tx| tx.send(RegistryEvent::Changed).is_ok());
    }

    fn compile(&self, cfg: TypeConfig, id: TypeId, atlas: &mut dyn TextureAtlas) -> Option<TypeDef> {
        let default_slice = match &cfg.texture {
            Some(path) => match atlas.register_texture(path) {
                Some(slice) => slice,
                None => {
                    log::warn!("cannot resolve texture '{}' for type '{}'", path, cfg.name);
                    return None;
                }
            },
            None => -1,
        };
        let mut faces: [Option<FaceTex>; FACE_COUNT] = Default::default();
        // Role keys first, then exact face keys on top. Secondary sort by
        // name keeps HashMap iteration order out of the result.
        let mut keys: Vec<&String> = cfg.faces.keys().collect();
        keys.sort_by_key(|k| (face_key_rank(k), (*k).clone()));
        for key in keys {
            let indices = face_indices_for_key(key);
            if indices.is_empty() {
                log::warn!("unknown face key '{}' on type '{}'", key, cfg.name);
                continue;
            }
            let entry = &cfg.faces[key];
            let tex = self.compile_face(entry, &cfg.name, atlas)?;
            for &f in indices {
                faces[f] = Some(tex.clone());
            }
        }
        Some(TypeDef {
            id,
            name: cfg.name,
            base_color: cfg.base_color,
            default_slice,
            faces,
            transparent: cfg.transparent,
            paintable: cfg.paintable,
        })
    }

    fn compile_face(
        &self,
        entry: &FaceTexConfig,
        ty_name: &str,
        atlas: &mut dyn TextureAtlas,
    ) -> Option<FaceTex> {
        let resolve = |atlas: &mut dyn TextureAtlas, path: &str| -> Option<i32> {
            let slice = atlas.register_texture(path);
            if slice.is_none() {
                log::warn!("cannot resolve texture '{}' for type '{}'", path, ty_name);
            }
            slice
        };
        match entry {
            FaceTexConfig::Path(path) => Some(FaceTex {
                slice: resolve(atlas, path)?,
                variation_chance: 0,
                variations: Vec::new(),
            }),
            FaceTexConfig::Detail {
                path,
                variation_chance,
                variations,
            } => {
                let slice = resolve(atlas, path)?;
                let mut out = Vec::with_capacity(variations.len());
                for v in variations {
                    out.push(resolve(atlas, v)?);
                }
                Some(FaceTex {
                    slice,
                    variation_chance: (*variation_chance).min(100),
                    variations: out,
                })
            }
        }
    }
}
