use crate::face::Face;

/// Per-face texture orientation fix-up: mirror along U, then rotate in
/// quarter turns. Applied to tile-space UVs so a texture reads the same way
/// up on every face regardless of which axis the face belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UvTransform {
    pub mirror_u: bool,
    pub rot_steps: u8,
}

/// Orientation table in face order `+X,-X,+Y,-Y,+Z,-Z`. The +X and -Z faces
/// mirror U so side textures wrap consistently around a cube; -Y rotates a
/// half turn so bottom textures align with the top.
pub const FACE_UV_TRANSFORMS: [UvTransform; 6] = [
    UvTransform {
        mirror_u: true,
        rot_steps: 0,
    },
    UvTransform {
        mirror_u: false,
        rot_steps: 0,
    },
    UvTransform {
        mirror_u: false,
        rot_steps: 0,
    },
    UvTransform {
        mirror_u: false,
        rot_steps: 2,
    },
    UvTransform {
        mirror_u: false,
        rot_steps: 0,
    },
    UvTransform {
        mirror_u: true,
        rot_steps: 0,
    },
];

/// Tile-space UVs for a `w x h` rectangle on `face`, in quad corner order
/// (origin, +u, +u+v, +v), after the face's orientation transform.
///
/// Mirroring maps `u -> w - u`. Each rotation step maps `(u,v) -> (v, w-u)`
/// and swaps the rectangle's width and height.
pub fn transform_quad_uvs(face: Face, w: f32, h: f32) -> [(f32, f32); 4] {
    let mut uvs = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
    let t = FACE_UV_TRANSFORMS[face.index()];
    let mut cw = w;
    let mut ch = h;
    if t.mirror_u {
        for uv in &mut uvs {
            uv.0 = cw - uv.0;
        }
    }
    for _ in 0..(t.rot_steps % 4) {
        for uv in &mut uvs {
            *uv = (uv.1, cw - uv.0);
        }
        core::mem::swap(&mut cw, &mut ch);
    }
    uvs
}
