//! Fixed chunk grid: edit routing, border exchange, remesh scheduling.
#![forbid(unsafe_code)]

mod grid;
mod host;

pub use grid::{MeshSink, ProtectedQuery, WorldGrid, protect_ground_layer};
pub use host::{ChunkHost, HostState};
