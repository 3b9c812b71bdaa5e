use carve_chunk::{BorderCache, CHUNK_SIZE, ChunkBuf, ChunkCoord};
use carve_mesh::build_chunk_mesh;
use carve_voxel::{MeshPalette, TypeDef, Voxel};
use proptest::prelude::*;

fn opaque_palette() -> MeshPalette {
    let def = |id: u16, name: &str| TypeDef {
        id,
        name: name.to_string(),
        base_color: [id as u8 * 40, 80, 90, 255],
        default_slice: id as i32,
        faces: Default::default(),
        transparent: false,
        paintable: false,
    };
    MeshPalette::from_defs(&[
        Some(TypeDef::air()),
        Some(def(1, "a")),
        Some(def(2, "b")),
        Some(def(3, "c")),
    ])
}

/// Exposed-face count by brute force: with only opaque types and open
/// borders, a face is exposed exactly when the neighbor cell is empty
/// or outside the chunk.
fn exposed_faces(buf: &ChunkBuf) -> usize {
    let n = CHUNK_SIZE as i32;
    let at = |x: i32, y: i32, z: i32| -> u16 {
        if x < 0 || y < 0 || z < 0 || x >= n || y >= n || z >= n {
            0
        } else {
            buf.get_local(x as usize, y as usize, z as usize).id
        }
    };
    let mut count = 0;
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                if at(x, y, z) == 0 {
                    continue;
                }
                for (dx, dy, dz) in [
                    (1, 0, 0),
                    (-1, 0, 0),
                    (0, 1, 0),
                    (0, -1, 0),
                    (0, 0, 1),
                    (0, 0, -1),
                ] {
                    if at(x + dx, y + dy, z + dz) == 0 {
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

fn merged_area(m: &carve_mesh::MeshOut) -> f32 {
    let mut total = 0.0;
    for q in 0..m.quad_count() {
        let p = |v: usize| {
            let i = (q * 4 + v) * 3;
            [m.positions[i], m.positions[i + 1], m.positions[i + 2]]
        };
        let d = |a: [f32; 3], b: [f32; 3]| {
            ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
        };
        total += d(p(0), p(1)) * d(p(0), p(3));
    }
    total
}

fn buf_from_cells(cells: &[(usize, usize, usize, u16)]) -> ChunkBuf {
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0, 0));
    for &(x, y, z, id) in cells {
        buf.set(x, y, z, Voxel::new(id));
    }
    buf
}

proptest! {
    /// Merging rectangles must neither drop nor double-cover any
    /// exposed cell: total quad area equals the exposed-face count.
    #[test]
    fn merged_area_matches_exposed_face_count(
        cells in proptest::collection::vec(
            (0..CHUNK_SIZE, 0..CHUNK_SIZE, 0..CHUNK_SIZE, 1u16..4),
            0..200,
        )
    ) {
        let buf = buf_from_cells(&cells);
        let m = build_chunk_mesh(&buf, &BorderCache::new(), &opaque_palette(), None, 7);
        let expected = exposed_faces(&buf) as f32;
        prop_assert!((merged_area(&m) - expected).abs() < 1e-3);
    }

    /// Every quad carries exactly 4 vertices and 6 indices, and index
    /// values stay within the vertex range.
    #[test]
    fn buffers_stay_consistent(
        cells in proptest::collection::vec(
            (0..CHUNK_SIZE, 0..CHUNK_SIZE, 0..CHUNK_SIZE, 1u16..4),
            0..120,
        ),
        seed in any::<u64>(),
    ) {
        let buf = buf_from_cells(&cells);
        let m = build_chunk_mesh(&buf, &BorderCache::new(), &opaque_palette(), None, seed);
        prop_assert_eq!(m.positions.len(), m.quad_count() * 12);
        prop_assert_eq!(m.colors.len(), m.quad_count() * 16);
        prop_assert_eq!(m.uv0.len(), m.quad_count() * 8);
        prop_assert_eq!(m.uv1.len(), m.quad_count() * 8);
        prop_assert_eq!(m.indices.len(), m.quad_count() * 6);
        for &i in &m.indices {
            prop_assert!((i as usize) < m.vertex_count());
        }
    }
}
