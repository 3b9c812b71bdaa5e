//! Voxel value type, type registry, and TOML type configuration.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod config;
pub mod palette;
pub mod registry;
pub mod types;

pub use atlas::{SequentialAtlas, TextureAtlas};
pub use config::{FaceTexConfig, TypeConfig, TypesConfig};
pub use palette::MeshPalette;
pub use registry::{RegistryEvent, TypeRegistry};
pub use types::{FACE_COUNT, FaceTex, Rgba, TypeDef, TypeId, Voxel, WHITE};
