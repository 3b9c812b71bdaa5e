use carve_geom::{Aabb, Vec3};
use carve_voxel::Rgba;

use crate::face::Face;

const QUAD_CCW: [u32; 6] = [0, 1, 2, 0, 2, 3];
const QUAD_CW: [u32; 6] = [0, 2, 1, 0, 3, 2];

/// The five parallel output buffers handed to the rendering/collision host,
/// plus the mesh extents. Every 4 consecutive vertices form one quad (two
/// triangles); `colors` is 4 bytes per vertex, `uv0`/`uv1` 2 floats per
/// vertex, `uv1.x` carries the resolved atlas slice index.
#[derive(Clone)]
pub struct MeshOut {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
    pub colors: Vec<u8>,
    pub uv0: Vec<f32>,
    pub uv1: Vec<f32>,
    pub bbox: Aabb,
}

impl Default for MeshOut {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
            colors: Vec::new(),
            uv0: Vec::new(),
            uv1: Vec::new(),
            bbox: Aabb::empty(),
        }
    }
}

impl MeshOut {
    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.positions.reserve(n_quads * 4 * 3);
        self.colors.reserve(n_quads * 4 * 4);
        self.uv0.reserve(n_quads * 4 * 2);
        self.uv1.reserve(n_quads * 4 * 2);
        self.indices.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertex_count() / 4
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends one face-aligned `w x h` rectangle at `origin` (already offset
    /// onto the outward boundary for positive faces). Winding is reversed for
    /// faces whose basis winds against the outward normal, so triangle
    /// orientation encodes the normal without a normal buffer.
    pub fn add_face_quad(
        &mut self,
        face: Face,
        origin: Vec3,
        w: f32,
        h: f32,
        uvs: [(f32, f32); 4],
        slice: f32,
        rgba: Rgba,
    ) {
        let base = self.vertex_count() as u32;
        let right = face.right();
        let up = face.up();
        let corners = [
            origin,
            origin + right * w,
            origin + right * w + up * h,
            origin + up * h,
        ];
        for (i, c) in corners.iter().enumerate() {
            self.positions.extend_from_slice(&[c.x, c.y, c.z]);
            self.colors.extend_from_slice(&rgba);
            self.uv0.extend_from_slice(&[uvs[i].0, uvs[i].1]);
            self.uv1.extend_from_slice(&[slice, 0.0]);
            self.bbox.grow(*c);
        }
        let order = if face.flip_winding() {
            &QUAD_CW
        } else {
            &QUAD_CCW
        };
        for &o in order {
            self.indices.push(base + o);
        }
    }
}
