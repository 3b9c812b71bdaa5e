use carve_voxel::TypeId;

use crate::{CHUNK_AREA, CHUNK_SIZE};

/// Six flat planes of neighbor occupancy, one per face direction in the
/// fixed `+X,-X,+Y,-Y,+Z,-Z` order. Cell `(u,v)` holds the type id of the
/// neighbor voxel directly across that face (0 = open), so surface
/// extraction never needs a pointer to the neighboring chunk.
///
/// Plane axes follow the mesher's mask convention: X faces use `(u,v) =
/// (z,y)`, Y faces `(x,z)`, Z faces `(x,y)`. The owning world grid refreshes
/// cells whenever a neighbor's boundary layer changes.
#[derive(Clone, Debug)]
pub struct BorderCache {
    planes: [Vec<TypeId>; 6],
}

impl Default for BorderCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BorderCache {
    pub fn new() -> Self {
        Self {
            planes: std::array::from_fn(|_| vec![0; CHUNK_AREA]),
        }
    }

    #[inline]
    fn cell(u: usize, v: usize) -> usize {
        u + CHUNK_SIZE * v
    }

    /// Occupancy across `face` at plane cell `(u,v)`. Out-of-range cells and
    /// faces read as open, so a bad lookup exposes a face instead of hiding
    /// geometry.
    #[inline]
    pub fn get(&self, face: usize, u: usize, v: usize) -> TypeId {
        if face >= 6 || u >= CHUNK_SIZE || v >= CHUNK_SIZE {
            return 0;
        }
        self.planes[face][Self::cell(u, v)]
    }

    #[inline]
    pub fn set(&mut self, face: usize, u: usize, v: usize, id: TypeId) -> bool {
        if face >= 6 || u >= CHUNK_SIZE || v >= CHUNK_SIZE {
            return false;
        }
        self.planes[face][Self::cell(u, v)] = id;
        true
    }

    /// Resets one plane to fully open (neighbor unloaded or emptied).
    pub fn clear_face(&mut self, face: usize) {
        if let Some(plane) = self.planes.get_mut(face) {
            plane.fill(0);
        }
    }

    pub fn is_all_open(&self) -> bool {
        self.planes
            .iter()
            .all(|p| p.iter().all(|&id| id == 0))
    }
}
