use rand::Rng;

use crate::types::{FACE_COUNT, FaceTex, Rgba, TypeDef, TypeId, WHITE};

/// Per-type slice lookup for one compiled definition.
#[derive(Clone, Debug, Default)]
pub struct FaceSlices {
    pub default_slice: i32,
    pub faces: [Option<FaceTex>; FACE_COUNT],
}

/// Immutable snapshot of the registry compiled for the mesher: base colors,
/// transparency/paintability flags, and per-face slice tables, all indexed by
/// `TypeId`. Rebuilt by the registry after every structural mutation, so
/// in-flight mesh jobs keep reading a consistent table.
#[derive(Clone, Debug, Default)]
pub struct MeshPalette {
    colors: Vec<Rgba>,
    transparent: Vec<bool>,
    paintable: Vec<bool>,
    slices: Vec<FaceSlices>,
}

impl MeshPalette {
    pub fn from_defs(defs: &[Option<TypeDef>]) -> Self {
        let n = defs.len();
        let mut pal = MeshPalette {
            colors: vec![WHITE; n],
            transparent: vec![false; n],
            paintable: vec![false; n],
            slices: vec![FaceSlices::default(); n],
        };
        for slot in pal.slices.iter_mut() {
            slot.default_slice = -1;
        }
        for (i, def) in defs.iter().enumerate() {
            let Some(def) = def else { continue };
            pal.colors[i] = def.base_color;
            pal.transparent[i] = def.transparent;
            pal.paintable[i] = def.paintable;
            pal.slices[i] = FaceSlices {
                default_slice: def.default_slice,
                faces: def.faces.clone(),
            };
        }
        pal
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Base color for a type id; white for out-of-range ids.
    #[inline]
    pub fn color(&self, id: TypeId) -> Rgba {
        self.colors.get(id as usize).copied().unwrap_or(WHITE)
    }

    /// Out-of-range ids read as opaque so unknown data occludes rather than
    /// punching holes into neighbors.
    #[inline]
    pub fn is_transparent(&self, id: TypeId) -> bool {
        self.transparent.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_paintable(&self, id: TypeId) -> bool {
        self.paintable.get(id as usize).copied().unwrap_or(false)
    }

    /// Resolves the texture slice for face `face` (index in `0..6`) of type
    /// `id`. A per-face texture may substitute one of its weighted random
    /// variations; otherwise the face slice applies, else the type default.
    /// Out-of-range ids and faces resolve to `-1` (untextured).
    pub fn resolve_slice<R: Rng>(&self, id: TypeId, face: usize, rng: &mut R) -> i32 {
        let Some(fs) = self.slices.get(id as usize) else {
            return -1;
        };
        match fs.faces.get(face) {
            Some(Some(ft)) => {
                if !ft.variations.is_empty()
                    && ft.variation_chance > 0
                    && rng.gen_range(0..100u8) < ft.variation_chance
                {
                    ft.variations[rng.gen_range(0..ft.variations.len())]
                } else {
                    ft.slice
                }
            }
            _ => fs.default_slice,
        }
    }
}
