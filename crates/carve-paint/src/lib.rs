//! Sparse per-voxel color overrides (the "paint" store).
#![forbid(unsafe_code)]

use carve_chunk::{CHUNK_SIZE, CHUNK_VOLUME, ChunkBuf, ChunkCoord};
use carve_voxel::Rgba;
use hashbrown::HashMap;

/// Index-aligned override arrays for one chunk, consumed by the mesher.
/// `mask[i]` marks voxel `i` (flat chunk index) as carrying `colors[i]`.
#[derive(Clone, Debug)]
pub struct PaintSnapshot {
    pub mask: Vec<bool>,
    pub colors: Vec<Rgba>,
}

/// Chunk-keyed sparse map from world voxel coordinate to an override color.
/// An entry forces the voxel's faces to render as unmerged 1x1 quads.
#[derive(Default)]
pub struct PaintStore {
    inner: HashMap<(i32, i32, i32), HashMap<(i32, i32, i32), Rgba>>,
}

impl PaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn chunk_key(wx: i32, wy: i32, wz: i32) -> (i32, i32, i32) {
        let n = CHUNK_SIZE as i32;
        (wx.div_euclid(n), wy.div_euclid(n), wz.div_euclid(n))
    }

    pub fn set(&mut self, wx: i32, wy: i32, wz: i32, color: Rgba) {
        let k = Self::chunk_key(wx, wy, wz);
        self.inner.entry(k).or_default().insert((wx, wy, wz), color);
    }

    /// Removes an override; returns whether one was present.
    pub fn clear_at(&mut self, wx: i32, wy: i32, wz: i32) -> bool {
        let k = Self::chunk_key(wx, wy, wz);
        let Some(m) = self.inner.get_mut(&k) else {
            return false;
        };
        let removed = m.remove(&(wx, wy, wz)).is_some();
        if m.is_empty() {
            self.inner.remove(&k);
        }
        removed
    }

    pub fn has(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let k = Self::chunk_key(wx, wy, wz);
        self.inner
            .get(&k)
            .is_some_and(|m| m.contains_key(&(wx, wy, wz)))
    }

    /// Override color at a coordinate, or `default` when none is set.
    pub fn get(&self, wx: i32, wy: i32, wz: i32, default: Rgba) -> Rgba {
        let k = Self::chunk_key(wx, wy, wz);
        self.inner
            .get(&k)
            .and_then(|m| m.get(&(wx, wy, wz)).copied())
            .unwrap_or(default)
    }

    /// Builds the mesher's index-aligned arrays for one chunk, or `None`
    /// when the chunk carries no overrides (the common case, so mesh jobs
    /// skip the allocation entirely).
    pub fn snapshot_for_chunk(&self, coord: ChunkCoord) -> Option<PaintSnapshot> {
        let m = self.inner.get(&(coord.cx, coord.cy, coord.cz))?;
        if m.is_empty() {
            return None;
        }
        let (bx, by, bz) = coord.base();
        let mut snap = PaintSnapshot {
            mask: vec![false; CHUNK_VOLUME],
            colors: vec![[0, 0, 0, 0]; CHUNK_VOLUME],
        };
        for (&(wx, wy, wz), &color) in m.iter() {
            let lx = (wx - bx) as usize;
            let ly = (wy - by) as usize;
            let lz = (wz - bz) as usize;
            let i = ChunkBuf::idx(lx, ly, lz);
            snap.mask[i] = true;
            snap.colors[i] = color;
        }
        Some(snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const GRAY: Rgba = [128, 128, 128, 255];

    #[test]
    fn set_get_clear_round_trip() {
        let mut store = PaintStore::new();
        assert!(!store.has(5, 6, 7));
        assert_eq!(store.get(5, 6, 7, GRAY), GRAY);
        store.set(5, 6, 7, RED);
        assert!(store.has(5, 6, 7));
        assert_eq!(store.get(5, 6, 7, GRAY), RED);
        assert!(store.clear_at(5, 6, 7));
        assert!(!store.clear_at(5, 6, 7));
        // The emptied chunk entry is dropped entirely.
        assert!(store.snapshot_for_chunk(ChunkCoord::new(0, 0, 0)).is_none());
    }

    #[test]
    fn negative_coordinates_key_into_the_right_chunk() {
        let mut store = PaintStore::new();
        store.set(-1, 0, 0, RED);
        // (-1,0,0) lives in chunk (-1,0,0), local x = N-1.
        let snap = store.snapshot_for_chunk(ChunkCoord::new(-1, 0, 0)).unwrap();
        let i = ChunkBuf::idx(CHUNK_SIZE - 1, 0, 0);
        assert!(snap.mask[i]);
        assert_eq!(snap.colors[i], RED);
        assert!(store.snapshot_for_chunk(ChunkCoord::new(0, 0, 0)).is_none());
    }

    #[test]
    fn snapshot_is_index_aligned() {
        let mut store = PaintStore::new();
        store.set(1, 2, 3, RED);
        store.set(0, 0, 0, GRAY);
        let snap = store.snapshot_for_chunk(ChunkCoord::new(0, 0, 0)).unwrap();
        assert_eq!(snap.mask.len(), CHUNK_VOLUME);
        assert_eq!(snap.colors.len(), CHUNK_VOLUME);
        assert!(snap.mask[ChunkBuf::idx(1, 2, 3)]);
        assert_eq!(snap.colors[ChunkBuf::idx(0, 0, 0)], GRAY);
        assert_eq!(snap.mask.iter().filter(|&&b| b).count(), 2);
    }
}
