use std::fmt;
use std::ops::Add;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{AIR_ID, OUT_OF_BOUNDS_ID};

/// Newtype for block type identifiers. 0 = air/empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: BlockId = BlockId(AIR_ID);

    /// Returned for queries into space with no loaded chunk. Never stored in a chunk.
    pub const OUT_OF_BOUNDS: BlockId = BlockId(OUT_OF_BOUNDS_ID);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }

    pub fn is_out_of_bounds(self) -> bool {
        self == Self::OUT_OF_BOUNDS
    }
}

/// World coordinate in voxel-space.
pub type WorldCoord = IVec3;

/// Chunk coordinate in chunk-space (each unit = one chunk edge of voxels).
///
/// Ordered lexicographically by (x, y, z) so collections keyed by it iterate
/// in a stable order from frame to frame.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const ORIGIN: ChunkCoord = ChunkCoord::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Largest per-axis distance (L-infinity). Saturates at `i32::MAX`.
    pub fn chebyshev_distance(self, other: ChunkCoord) -> i32 {
        let dx = (self.x as i64 - other.x as i64).abs();
        let dy = (self.y as i64 - other.y as i64).abs();
        let dz = (self.z as i64 - other.z as i64).abs();
        dx.max(dy).max(dz).min(i32::MAX as i64) as i32
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_squared(self, other: ChunkCoord) -> i64 {
        let x = self.x as i64 - other.x as i64;
        let y = self.y as i64 - other.y as i64;
        let z = self.z as i64 - other.z as i64;
        x.saturating_mul(x)
            .saturating_add(y.saturating_mul(y))
            .saturating_add(z.saturating_mul(z))
    }
}

impl From<IVec3> for ChunkCoord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<ChunkCoord> for IVec3 {
    fn from(c: ChunkCoord) -> Self {
        c.as_ivec3()
    }
}

/// Offsetting saturates at the edge of the `i32` range.
impl Add<IVec3> for ChunkCoord {
    type Output = ChunkCoord;

    fn add(self, rhs: IVec3) -> ChunkCoord {
        ChunkCoord::from(self.as_ivec3().saturating_add(rhs))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
