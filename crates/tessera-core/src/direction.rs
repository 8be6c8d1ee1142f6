use glam::IVec3;

/// One of the 6 face directions of a cube-shaped cell (voxel or chunk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    East = 4,
    West = 5,
}

/// All 6 faces.
pub const ALL_FACES: [Face; 6] = [
    Face::Down,
    Face::Up,
    Face::North,
    Face::South,
    Face::East,
    Face::West,
];

impl Face {
    /// Offset vector for this face. Y-up convention: Down = (0,-1,0).
    pub fn offset(self) -> IVec3 {
        match self {
            Face::Down => IVec3::new(0, -1, 0),
            Face::Up => IVec3::new(0, 1, 0),
            Face::North => IVec3::new(0, 0, -1),
            Face::South => IVec3::new(0, 0, 1),
            Face::East => IVec3::new(1, 0, 0),
            Face::West => IVec3::new(-1, 0, 0),
        }
    }

    /// Faces of the enclosing chunk that a local voxel offset lies against.
    ///
    /// A voxel in a chunk corner touches three faces, one on an edge touches
    /// two, and an interior voxel touches none. `local` must already be in
    /// `0..edge` on every axis.
    pub fn touching(local: IVec3, edge: i32) -> Vec<Face> {
        let last = IVec3::splat(edge - 1);
        ALL_FACES
            .into_iter()
            .filter(|face| {
                let next = local + face.offset();
                next.cmplt(IVec3::ZERO).any() || next.cmpgt(last).any()
            })
            .collect()
    }
}
