//! Fixed-size chunk buffer and neighbor border cache.
#![forbid(unsafe_code)]

mod border;

pub use border::BorderCache;

use carve_voxel::Voxel;

/// Edge length of a cubic chunk, in voxels.
pub const CHUNK_SIZE: usize = 16;
/// Voxel count of one chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;
/// Cell count of one border plane.
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Position of a chunk within the world grid, in chunk units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// World voxel coordinate of this chunk's (0,0,0) corner.
    #[inline]
    pub fn base(self) -> (i32, i32, i32) {
        let n = CHUNK_SIZE as i32;
        (self.cx * n, self.cy * n, self.cz * n)
    }
}

/// Flat voxel storage for one chunk, indexed `x + N*(y + N*z)`.
/// Allocated once at world init and mutated in place by edits.
#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    voxels: Vec<Voxel>,
}

impl ChunkBuf {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            voxels: vec![Voxel::AIR; CHUNK_VOLUME],
        }
    }

    #[inline]
    pub fn idx(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_SIZE * (y + CHUNK_SIZE * z)
    }

    /// Checked read; out-of-range local coordinates return `None`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<Voxel> {
        if x >= CHUNK_SIZE || y >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return None;
        }
        Some(self.voxels[Self::idx(x, y, z)])
    }

    /// Unchecked-by-construction read for callers that already validated
    /// coordinates (the mesher's inner loops).
    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[Self::idx(x, y, z)]
    }

    /// Checked write; out-of-range coordinates are rejected.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: Voxel) -> bool {
        if x >= CHUNK_SIZE || y >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return false;
        }
        self.voxels[Self::idx(x, y, z)] = v;
        true
    }

    #[inline]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.voxels.iter().any(|v| !v.is_empty())
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        !self.has_non_air()
    }
}
