/// Numeric voxel type identifier. Id 0 always means empty/air.
pub type TypeId = u16;

/// Packed RGBA color, 8 bits per channel.
pub type Rgba = [u8; 4];

/// Fallback color for ids missing from the palette.
pub const WHITE: Rgba = [255, 255, 255, 255];

/// Number of cube faces; face order is fixed as `+X,-X,+Y,-Y,+Z,-Z`.
pub const FACE_COUNT: usize = 6;

/// A single cell of the world grid. Equality is structural.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub id: TypeId,
}

impl Voxel {
    pub const AIR: Voxel = Voxel { id: 0 };

    #[inline]
    pub const fn new(id: TypeId) -> Self {
        Self { id }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.id == 0
    }
}

/// Per-face texture with optional weighted random variations.
/// `variation_chance` is a percentage in `0..=100`; when a draw falls under
/// it, one of `variations` is picked uniformly instead of `slice`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceTex {
    pub slice: i32,
    pub variation_chance: u8,
    pub variations: Vec<i32>,
}

/// Compiled voxel type definition with all texture slices resolved.
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub id: TypeId,
    pub name: String,
    pub base_color: Rgba,
    /// Slice used for faces without a per-face texture. `-1` = no texture.
    pub default_slice: i32,
    pub faces: [Option<FaceTex>; FACE_COUNT],
    pub transparent: bool,
    pub paintable: bool,
}

impl TypeDef {
    /// The built-in empty definition kept at registry slot 0.
    pub fn air() -> Self {
        TypeDef {
            id: 0,
            name: "air".to_string(),
            base_color: [0, 0, 0, 0],
            default_slice: -1,
            faces: Default::default(),
            transparent: true,
            paintable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_voxel_is_empty() {
        assert!(Voxel::AIR.is_empty());
        assert!(!Voxel::new(3).is_empty());
        assert_eq!(Voxel::default(), Voxel::AIR);
    }

    #[test]
    fn air_def_has_fixed_id_zero() {
        let air = TypeDef::air();
        assert_eq!(air.id, 0);
        assert_eq!(air.default_slice, -1);
        assert!(air.faces.iter().all(|f| f.is_none()));
    }
}
