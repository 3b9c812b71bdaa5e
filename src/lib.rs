//! Voxel surface-extraction engine: chunked voxel grids in, minimal
//! greedy-merged quad meshes out.
//!
//! The crates compose bottom-up: [`carve_voxel`] defines types and the
//! registry, [`carve_chunk`] the storage and border caches,
//! [`carve_mesh`] the greedy mesher, [`carve_runtime`] the background
//! workers, and [`carve_world`] ties them into an editable chunk grid.
//! This crate re-exports the pieces most callers need.
#![forbid(unsafe_code)]

pub use carve_geom::{Aabb, Vec3};

pub use carve_voxel::{
    FaceTex, FaceTexConfig, MeshPalette, RegistryEvent, Rgba, SequentialAtlas, TextureAtlas,
    TypeConfig, TypeDef, TypeId, TypeRegistry, TypesConfig, Voxel, WHITE,
};

pub use carve_chunk::{BorderCache, CHUNK_SIZE, CHUNK_VOLUME, ChunkBuf, ChunkCoord};

pub use carve_paint::{PaintSnapshot, PaintStore};

pub use carve_mesh::{Face, MeshOut, build_chunk_mesh};

pub use carve_runtime::{JobKind, JobOut, MeshJob, Runtime};

pub use carve_world::{
    ChunkHost, HostState, MeshSink, ProtectedQuery, WorldGrid, protect_ground_layer,
};
