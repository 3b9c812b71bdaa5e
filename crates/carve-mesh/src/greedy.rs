use carve_chunk::{BorderCache, CHUNK_SIZE, ChunkBuf};
use carve_geom::Vec3;
use carve_paint::PaintSnapshot;
use carve_voxel::{MeshPalette, Rgba, TypeId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::buffers::MeshOut;
use crate::face::Face;
use crate::uv::transform_quad_uvs;

/// Whether the voxel occupying `nid` hides a face of a voxel of type `id`.
/// Transparent neighbors only occlude within the same type (no internal
/// faces inside a glass slab); unknown ids read as opaque occluders.
#[inline]
fn occludes(palette: &MeshPalette, id: TypeId, nid: TypeId) -> bool {
    nid != 0 && (!palette.is_transparent(nid) || nid == id)
}

/// Greedy surface extraction for one chunk snapshot.
///
/// Runs six independent face passes. Each pass walks the chunk's slice
/// layers, builds an `N x N` exposure mask of type ids (consulting the
/// border cache when the neighbor falls outside the chunk), then merges the
/// mask into maximal same-type rectangles. Cells carrying a color override
/// never merge; each becomes its own 1x1 quad.
///
/// `seed` drives texture-variation draws; identical inputs and seed produce
/// byte-identical buffers.
pub fn build_chunk_mesh(
    buf: &ChunkBuf,
    borders: &BorderCache,
    palette: &MeshPalette,
    overlay: Option<&PaintSnapshot>,
    seed: u64,
) -> MeshOut {
    let mut out = MeshOut::default();
    if buf.is_all_air() {
        return out;
    }
    out.reserve_quads(256);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = CHUNK_SIZE;
    let mut mask: Vec<TypeId> = vec![0; n * n];
    let mut ovr: Vec<bool> = vec![false; n * n];
    let mut ovr_col: Vec<Rgba> = vec![[0; 4]; n * n];

    for face in Face::ALL {
        let axis = face.axis();
        let (ua, va) = face.axes();
        let step: i32 = if face.is_positive() { 1 } else { -1 };
        for layer in 0..n {
            let mut any = false;
            for v in 0..n {
                for u in 0..n {
                    let m = u + n * v;
                    mask[m] = 0;
                    ovr[m] = false;
                    let mut p = [0usize; 3];
                    p[axis] = layer;
                    p[ua] = u;
                    p[va] = v;
                    let vox = buf.get_local(p[0], p[1], p[2]);
                    if vox.is_empty() {
                        continue;
                    }
                    let next = layer as i32 + step;
                    let nid = if (0..n as i32).contains(&next) {
                        let mut q = p;
                        q[axis] = next as usize;
                        buf.get_local(q[0], q[1], q[2]).id
                    } else {
                        borders.get(face.index(), u, v)
                    };
                    if occludes(palette, vox.id, nid) {
                        continue;
                    }
                    mask[m] = vox.id;
                    any = true;
                    if let Some(snap) = overlay {
                        if palette.is_paintable(vox.id) {
                            let i = ChunkBuf::idx(p[0], p[1], p[2]);
                            if snap.mask[i] {
                                ovr[m] = true;
                                ovr_col[m] = snap.colors[i];
                            }
                        }
                    }
                }
            }
            if !any {
                continue;
            }
            merge_layer(
                &mut out, &mut rng, palette, face, layer, &mut mask, &mut ovr, &ovr_col,
            );
        }
    }
    out
}

/// Merges one exposure mask into maximal rectangles and emits their quads.
/// Consumed cells are zeroed immediately after a quad is emitted.
#[allow(clippy::too_many_arguments)]
fn merge_layer(
    out: &mut MeshOut,
    rng: &mut ChaCha8Rng,
    palette: &MeshPalette,
    face: Face,
    layer: usize,
    mask: &mut [TypeId],
    ovr: &mut [bool],
    ovr_col: &[Rgba],
) {
    let n = CHUNK_SIZE;
    let axis = face.axis();
    let (ua, va) = face.axes();
    for v in 0..n {
        let mut u = 0;
        while u < n {
            let m = u + n * v;
            let id = mask[m];
            if id == 0 {
                u += 1;
                continue;
            }
            let (w, h) = if ovr[m] {
                (1, 1)
            } else {
                let mut w = 1;
                while u + w < n {
                    let c = u + w + n * v;
                    if mask[c] != id || ovr[c] {
                        break;
                    }
                    w += 1;
                }
                let mut h = 1;
                'rows: while v + h < n {
                    for k in 0..w {
                        let c = u + k + n * (v + h);
                        if mask[c] != id || ovr[c] {
                            break 'rows;
                        }
                    }
                    h += 1;
                }
                (w, h)
            };

            let slice = palette.resolve_slice(id, face.index(), rng) as f32;
            let rgba = if ovr[m] { ovr_col[m] } else { palette.color(id) };
            let mut o = [0f32; 3];
            // Positive-facing quads sit on the outward boundary of the cell.
            o[axis] = (layer + usize::from(face.is_positive())) as f32;
            o[ua] = u as f32;
            o[va] = v as f32;
            let uvs = transform_quad_uvs(face, w as f32, h as f32);
            out.add_face_quad(
                face,
                Vec3::new(o[0], o[1], o[2]),
                w as f32,
                h as f32,
                uvs,
                slice,
                rgba,
            );

            for dv in 0..h {
                for du in 0..w {
                    let c = u + du + n * (v + dv);
                    mask[c] = 0;
                    ovr[c] = false;
                }
            }
            u += w;
        }
    }
}
