use carve_geom::Vec3;

/// Cube face directions in the fixed `+X,-X,+Y,-Y,+Z,-Z` order. The
/// discriminant doubles as the index into border-cache planes, per-face
/// texture tables, and the UV transform table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    /// Falls back to `PosX` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> Face {
        match i {
            0 => Face::PosX,
            1 => Face::NegX,
            2 => Face::PosY,
            3 => Face::NegY,
            4 => Face::PosZ,
            5 => Face::NegZ,
            _ => Face::PosX,
        }
    }

    /// Axis this face is perpendicular to (0 = X, 1 = Y, 2 = Z).
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Face::PosX | Face::NegX => 0,
            Face::PosY | Face::NegY => 1,
            Face::PosZ | Face::NegZ => 2,
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::PosZ)
    }

    /// Integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// The mask/plane axes `(u, v)` for this face: X faces map `(u,v)` to
    /// `(z,y)`, Y faces to `(x,z)`, Z faces to `(x,y)`. Border-cache planes
    /// use the same convention.
    #[inline]
    pub fn axes(self) -> (usize, usize) {
        match self.axis() {
            0 => (2, 1),
            1 => (0, 2),
            _ => (0, 1),
        }
    }

    /// Quad basis vector along the mask's `u` axis.
    #[inline]
    pub fn right(self) -> Vec3 {
        Vec3::axis_unit(self.axes().0)
    }

    /// Quad basis vector along the mask's `v` axis.
    #[inline]
    pub fn up(self) -> Vec3 {
        Vec3::axis_unit(self.axes().1)
    }

    /// Unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::new(dx as f32, dy as f32, dz as f32)
    }

    /// Whether the default corner order `[0,1,2,0,2,3]` winds *against* the
    /// outward normal for this face, i.e. the reversed order must be used.
    /// Follows from `right x up` versus the face normal.
    #[inline]
    pub fn flip_winding(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::NegZ)
    }
}
