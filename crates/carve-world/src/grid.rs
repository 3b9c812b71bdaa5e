use crossbeam_channel::Receiver;

use carve_chunk::{CHUNK_SIZE, ChunkCoord};
use carve_mesh::{Face, MeshOut};
use carve_paint::PaintStore;
use carve_runtime::{MeshJob, Runtime};
use carve_voxel::{RegistryEvent, TypeRegistry, Voxel};

use crate::host::ChunkHost;

/// Receives finished chunk meshes from [`WorldGrid::update`]. The grid
/// owns scheduling; the sink only stores or uploads what it is handed.
pub trait MeshSink {
    fn commit(&mut self, coord: ChunkCoord, mesh: &MeshOut);

    /// Called when a remesh produced no geometry and any previously
    /// committed mesh for the chunk should be dropped.
    fn clear(&mut self, _coord: ChunkCoord) {}
}

/// Predicate over world voxel coordinates; `true` means the voxel may
/// not be removed.
pub type ProtectedQuery = Box<dyn Fn(i32, i32, i32) -> bool + Send + Sync>;

/// Protects the `y == 0` floor layer from removal.
pub fn protect_ground_layer() -> ProtectedQuery {
    Box::new(|_x, y, _z| y == 0)
}

/// Fixed grid of chunk hosts addressed by world voxel coordinates.
/// Routes edits to the owning chunk, mirrors boundary voxels into
/// neighbor border caches, and drives the remesh pipeline.
pub struct WorldGrid {
    dims: (usize, usize, usize),
    hosts: Vec<ChunkHost>,
    protected: Option<ProtectedQuery>,
    registry_rx: Option<Receiver<RegistryEvent>>,
    seed: u64,
    next_job_id: u64,
}

impl WorldGrid {
    pub fn new(chunks_x: usize, chunks_y: usize, chunks_z: usize, seed: u64) -> Self {
        let mut hosts = Vec::with_capacity(chunks_x * chunks_y * chunks_z);
        for cz in 0..chunks_z {
            for cy in 0..chunks_y {
                for cx in 0..chunks_x {
                    hosts.push(ChunkHost::new(ChunkCoord::new(
                        cx as i32, cy as i32, cz as i32,
                    )));
                }
            }
        }
        Self {
            dims: (chunks_x, chunks_y, chunks_z),
            hosts,
            protected: None,
            registry_rx: None,
            seed,
            next_job_id: 0,
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    pub fn set_protected(&mut self, query: Option<ProtectedQuery>) {
        self.protected = query;
    }

    /// Subscribes to registry changes; any change observed in `update`
    /// marks every chunk dirty so stale colors and slices get rebuilt.
    pub fn attach_registry(&mut self, reg: &mut TypeRegistry) {
        self.registry_rx = Some(reg.subscribe());
    }

    fn host_index(&self, cx: i32, cy: i32, cz: i32) -> Option<usize> {
        let (nx, ny, nz) = self.dims;
        if cx < 0 || cy < 0 || cz < 0 {
            return None;
        }
        let (cx, cy, cz) = (cx as usize, cy as usize, cz as usize);
        if cx >= nx || cy >= ny || cz >= nz {
            return None;
        }
        Some(cx + nx * (cy + ny * cz))
    }

    fn locate(&self, wx: i32, wy: i32, wz: i32) -> Option<(usize, usize, usize, usize)> {
        let n = CHUNK_SIZE as i32;
        let idx = self.host_index(wx.div_euclid(n), wy.div_euclid(n), wz.div_euclid(n))?;
        Some((
            idx,
            wx.rem_euclid(n) as usize,
            wy.rem_euclid(n) as usize,
            wz.rem_euclid(n) as usize,
        ))
    }

    /// Chunk host owning a world voxel coordinate, translated by
    /// floor division; `None` outside the grid.
    pub fn chunk_at(&self, wx: i32, wy: i32, wz: i32) -> Option<&ChunkHost> {
        self.locate(wx, wy, wz).map(|(idx, ..)| &self.hosts[idx])
    }

    /// Chunk host by grid index.
    pub fn host_at(&self, coord: ChunkCoord) -> Option<&ChunkHost> {
        self.host_index(coord.cx, coord.cy, coord.cz)
            .map(|i| &self.hosts[i])
    }

    /// Reads a voxel by world coordinates; outside the grid reads air.
    pub fn get_voxel(&self, wx: i32, wy: i32, wz: i32) -> Voxel {
        match self.locate(wx, wy, wz) {
            Some((idx, lx, ly, lz)) => self.hosts[idx].buf.get_local(lx, ly, lz),
            None => Voxel::AIR,
        }
    }

    /// Writes a voxel by world coordinates and marks the owning chunk
    /// (and any face-adjacent neighbors, via their border caches) for
    /// an urgent remesh. Out-of-grid writes and protected removals are
    /// no-ops; returns whether the write landed.
    pub fn set_voxel(&mut self, wx: i32, wy: i32, wz: i32, v: Voxel) -> bool {
        let Some((idx, lx, ly, lz)) = self.locate(wx, wy, wz) else {
            log::debug!("edit outside grid at ({wx},{wy},{wz}) ignored");
            return false;
        };
        if v.is_empty()
            && let Some(q) = &self.protected
            && q(wx, wy, wz)
        {
            log::debug!("removal of protected voxel at ({wx},{wy},{wz}) ignored");
            return false;
        }
        if self.hosts[idx].buf.get_local(lx, ly, lz) == v {
            return true;
        }
        self.hosts[idx].buf.set(lx, ly, lz, v);
        self.hosts[idx].mark_dirty(true);

        // Mirror boundary voxels into the adjacent chunks' border
        // caches so their occlusion stays correct across the seam.
        let coord = self.hosts[idx].coord;
        let local = [lx, ly, lz];
        for face in Face::ALL {
            let edge = if face.is_positive() { CHUNK_SIZE - 1 } else { 0 };
            if local[face.axis()] != edge {
                continue;
            }
            let (dx, dy, dz) = face.delta();
            let Some(ni) = self.host_index(coord.cx + dx, coord.cy + dy, coord.cz + dz) else {
                continue;
            };
            let (ua, va) = face.axes();
            self.hosts[ni]
                .borders
                .set(face.opposite().index(), local[ua], local[va], v.id);
            self.hosts[ni].mark_dirty(true);
        }
        true
    }

    /// Marks the chunk owning a world coordinate for remeshing without
    /// touching voxel data. Used after paint-override edits.
    pub fn touch(&mut self, wx: i32, wy: i32, wz: i32) {
        if let Some((idx, ..)) = self.locate(wx, wy, wz) {
            self.hosts[idx].mark_dirty(true);
        }
    }

    pub fn mark_all_dirty(&mut self) {
        for h in &mut self.hosts {
            h.mark_dirty(false);
        }
    }

    /// Chunks currently owing a remesh (dirty or in flight).
    pub fn pending_count(&self) -> usize {
        self.hosts
            .iter()
            .filter(|h| !matches!(h.state, crate::host::HostState::Clean))
            .count()
    }

    /// One pump of the pipeline: fold in registry changes, apply
    /// finished jobs through the sink, then schedule remeshes for dirty
    /// chunks. Intended to be called once per frame or poll tick.
    pub fn update(
        &mut self,
        runtime: &Runtime,
        reg: &TypeRegistry,
        paint: &PaintStore,
        sink: &mut dyn MeshSink,
    ) {
        if let Some(rx) = &self.registry_rx {
            let changes = rx.try_iter().count();
            if changes > 0 {
                log::info!("type registry changed ({changes} events); remeshing all chunks");
                self.mark_all_dirty();
            }
        }

        for out in runtime.drain_worker_results() {
            let Some(idx) = self.host_index(out.coord.cx, out.coord.cy, out.coord.cz) else {
                continue;
            };
            if self.hosts[idx].on_result(out.rev) {
                match &out.mesh {
                    Some(mesh) => sink.commit(out.coord, mesh),
                    None => sink.clear(out.coord),
                }
            }
        }

        let palette = reg.mesh_palette();
        for i in 0..self.hosts.len() {
            if !self.hosts[i].wants_schedule() {
                continue;
            }
            let host = &self.hosts[i];
            let job = MeshJob {
                coord: host.coord,
                rev: host.rev,
                job_id: self.next_job_id,
                buf: host.buf.clone(),
                borders: host.borders.clone(),
                palette: palette.clone(),
                overlay: paint.snapshot_for_chunk(host.coord),
                seed: chunk_seed(self.seed, host.coord),
            };
            self.next_job_id += 1;
            let urgent = host.urgent;
            self.hosts[i].on_scheduled();
            if urgent {
                runtime.submit_mesh_job_edit(job);
            } else {
                runtime.submit_mesh_job_bg(job);
            }
        }
    }
}

/// Stable per-chunk seed: the same world seed and coordinate always
/// produce the same variant rolls, keeping remeshes idempotent.
fn chunk_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    let mut h = world_seed ^ 0x9E37_79B9_7F4A_7C15;
    for v in [coord.cx, coord.cy, coord.cz] {
        h ^= v as u64;
        h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h ^= h >> 27;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostState;

    #[test]
    fn out_of_grid_edits_are_ignored() {
        let mut grid = WorldGrid::new(1, 1, 1, 0);
        assert!(!grid.set_voxel(-1, 0, 0, Voxel::new(1)));
        assert!(!grid.set_voxel(0, 16, 0, Voxel::new(1)));
        assert_eq!(grid.get_voxel(99, 0, 0), Voxel::AIR);
        assert_eq!(grid.pending_count(), 0);
    }

    #[test]
    fn edits_round_trip_and_dirty_the_owner() {
        let mut grid = WorldGrid::new(2, 1, 1, 0);
        assert!(grid.set_voxel(20, 5, 7, Voxel::new(3)));
        assert_eq!(grid.get_voxel(20, 5, 7), Voxel::new(3));
        let host = grid.host_at(ChunkCoord::new(1, 0, 0)).unwrap();
        assert_eq!(host.state, HostState::Dirty);
        assert_eq!(host.rev, 1);
        // The untouched chunk stays clean.
        let other = grid.host_at(ChunkCoord::new(0, 0, 0)).unwrap();
        assert_eq!(other.state, HostState::Clean);
    }

    #[test]
    fn chunk_at_translates_world_coordinates() {
        let mut grid = WorldGrid::new(2, 2, 2, 0);
        grid.set_voxel(20, 17, 30, Voxel::new(4));
        // (20,17,30) floor-divides into chunk (1,1,1).
        let host = grid.chunk_at(20, 17, 30).unwrap();
        assert_eq!(host.coord, ChunkCoord::new(1, 1, 1));
        assert_eq!(host.buf.get(4, 1, 14), Some(Voxel::new(4)));
        assert_eq!(grid.chunk_at(3, 3, 3).unwrap().coord, ChunkCoord::new(0, 0, 0));
        assert!(grid.chunk_at(-1, 0, 0).is_none());
        assert!(grid.chunk_at(0, 32, 0).is_none());
    }

    #[test]
    fn redundant_writes_do_not_bump_revisions() {
        let mut grid = WorldGrid::new(1, 1, 1, 0);
        grid.set_voxel(1, 1, 1, Voxel::new(2));
        grid.set_voxel(1, 1, 1, Voxel::new(2));
        assert_eq!(grid.host_at(ChunkCoord::new(0, 0, 0)).unwrap().rev, 1);
    }

    #[test]
    fn protected_layer_blocks_removal_but_not_placement() {
        let mut grid = WorldGrid::new(1, 1, 1, 0);
        grid.set_protected(Some(protect_ground_layer()));
        assert!(grid.set_voxel(4, 0, 4, Voxel::new(1)));
        assert!(!grid.set_voxel(4, 0, 4, Voxel::AIR));
        assert_eq!(grid.get_voxel(4, 0, 4), Voxel::new(1));
        // Removal above the floor is fine.
        assert!(grid.set_voxel(4, 1, 4, Voxel::new(1)));
        assert!(grid.set_voxel(4, 1, 4, Voxel::AIR));
    }

    #[test]
    fn boundary_edits_mirror_into_neighbor_borders() {
        let mut grid = WorldGrid::new(2, 1, 1, 0);
        // Last column of chunk 0 along +X.
        grid.set_voxel(15, 3, 9, Voxel::new(5));
        let neighbor = grid.host_at(ChunkCoord::new(1, 0, 0)).unwrap();
        assert_eq!(neighbor.state, HostState::Dirty);
        // Neighbor's -X plane, (u,v) = (z,y).
        assert_eq!(neighbor.borders.get(Face::NegX.index(), 9, 3), 5);
        // Clearing the voxel reopens the plane cell.
        grid.set_voxel(15, 3, 9, Voxel::AIR);
        let neighbor = grid.host_at(ChunkCoord::new(1, 0, 0)).unwrap();
        assert_eq!(neighbor.borders.get(Face::NegX.index(), 9, 3), 0);
    }

    #[test]
    fn interior_edits_leave_neighbors_alone() {
        let mut grid = WorldGrid::new(2, 2, 2, 0);
        grid.set_voxel(8, 8, 8, Voxel::new(1));
        let dirty = (0..2)
            .flat_map(|z| (0..2).flat_map(move |y| (0..2).map(move |x| (x, y, z))))
            .filter(|&(x, y, z)| {
                grid.host_at(ChunkCoord::new(x, y, z)).unwrap().state != HostState::Clean
            })
            .count();
        assert_eq!(dirty, 1);
    }

    #[test]
    fn chunk_seed_is_stable_and_coordinate_sensitive() {
        let a = chunk_seed(7, ChunkCoord::new(1, 2, 3));
        assert_eq!(a, chunk_seed(7, ChunkCoord::new(1, 2, 3)));
        assert_ne!(a, chunk_seed(7, ChunkCoord::new(3, 2, 1)));
        assert_ne!(a, chunk_seed(8, ChunkCoord::new(1, 2, 3)));
    }
}
