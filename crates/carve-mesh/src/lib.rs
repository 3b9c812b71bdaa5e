//! CPU greedy meshing: chunk snapshot in, renderable quad buffers out.
#![forbid(unsafe_code)]

mod buffers;
mod face;
mod greedy;
mod uv;

pub use buffers::MeshOut;
pub use face::Face;
pub use greedy::build_chunk_mesh;
pub use uv::{FACE_UV_TRANSFORMS, UvTransform, transform_quad_uvs};
