use glam::{IVec3, Vec3};

use crate::constants::{MAX_CHUNK_SIZE, MAX_WORLD_COORD};
use crate::error::ConfigError;
use crate::types::{ChunkCoord, WorldCoord};

/// Converts between observer space, chunk-grid space and intra-chunk voxel space.
///
/// Every conversion floors toward negative infinity so chunk boundaries line up
/// on both sides of the origin. A grid holds no chunk state; the same input always
/// maps to the same output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGrid {
    edge: i32,
}

impl ChunkGrid {
    pub fn new(edge: i32) -> Result<Self, ConfigError> {
        if edge < 1 || edge > MAX_CHUNK_SIZE {
            return Err(ConfigError::InvalidChunkSize {
                actual: edge,
                max: MAX_CHUNK_SIZE,
            });
        }
        Ok(Self { edge })
    }

    /// Chunk edge length in voxels.
    pub fn edge(&self) -> i32 {
        self.edge
    }

    /// Voxels per chunk (`edge^3`).
    pub fn volume(&self) -> usize {
        let e = self.edge as usize;
        e * e * e
    }

    /// Chunk containing a continuous world-space position.
    ///
    /// Goes through `to_voxel`, so the observer's chunk always owns the voxel
    /// the block accessors resolve for the same position.
    pub fn to_chunk_coord(&self, position: Vec3) -> ChunkCoord {
        self.to_voxel_offset(self.to_voxel(position)).0
    }

    /// Voxel containing a continuous world-space position.
    ///
    /// Clamped to `-MAX_WORLD_COORD..MAX_WORLD_COORD` on every axis. NaN maps
    /// to 0.
    pub fn to_voxel(&self, position: Vec3) -> WorldCoord {
        position.floor().as_ivec3().clamp(
            IVec3::splat(-MAX_WORLD_COORD),
            IVec3::splat(MAX_WORLD_COORD - 1),
        )
    }

    /// Split a voxel position into its owning chunk and the local offset inside it.
    /// The offset is in `0..edge` on every axis.
    pub fn to_voxel_offset(&self, world: WorldCoord) -> (ChunkCoord, IVec3) {
        let e = self.edge;
        let chunk = IVec3::new(
            world.x.div_euclid(e),
            world.y.div_euclid(e),
            world.z.div_euclid(e),
        );
        let local = IVec3::new(
            world.x.rem_euclid(e),
            world.y.rem_euclid(e),
            world.z.rem_euclid(e),
        );
        (ChunkCoord::from(chunk), local)
    }

    /// World-space voxel position of a chunk's (0, 0, 0) corner.
    ///
    /// None when some voxel of the chunk falls outside the `i32` range.
    pub fn chunk_origin(&self, chunk: ChunkCoord) -> Option<WorldCoord> {
        let axis = |c: i32| {
            let origin = c.checked_mul(self.edge)?;
            origin.checked_add(self.edge - 1)?;
            Some(origin)
        };
        Some(IVec3::new(axis(chunk.x)?, axis(chunk.y)?, axis(chunk.z)?))
    }
}

/// Flat voxel index inside a chunk of side `edge`: `x + y*edge + z*edge^2`.
/// Returns None when the offset is outside the chunk.
pub fn local_index(local: IVec3, edge: i32) -> Option<usize> {
    if local.cmplt(IVec3::ZERO).any() || local.cmpge(IVec3::splat(edge)).any() {
        return None;
    }
    let e = edge as usize;
    Some(local.x as usize + local.y as usize * e + local.z as usize * e * e)
}

/// Convert a rendering-camera position into voxel world space.
///
/// The chunk view never applies this itself: callers that render voxels at a
/// scale other than one camera unit per voxel normalize positions here before
/// calling `tick` or the block accessors.
pub fn camera_to_world(camera: Vec3, units_per_voxel: f32) -> Vec3 {
    camera / units_per_voxel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid16() -> ChunkGrid {
        ChunkGrid::new(16).expect("valid edge")
    }

    #[test]
    fn test_rejects_non_positive_edge() {
        assert!(ChunkGrid::new(0).is_err());
        assert!(ChunkGrid::new(-4).is_err());
    }

    #[test]
    fn test_chunk_coord_origin_and_boundary() {
        let grid = grid16();
        assert_eq!(grid.to_chunk_coord(Vec3::ZERO), ChunkCoord::ORIGIN);
        assert_eq!(grid.to_chunk_coord(Vec3::new(15.99, 0.0, 0.0)), ChunkCoord::ORIGIN);
        assert_eq!(
            grid.to_chunk_coord(Vec3::new(16.0, 0.0, 0.0)),
            ChunkCoord::new(1, 0, 0)
        );
        assert_eq!(
            grid.to_chunk_coord(Vec3::new(17.0, 0.0, 0.0)),
            ChunkCoord::new(1, 0, 0)
        );
    }

    #[test]
    fn test_negative_positions_floor() {
        let grid = grid16();
        // -0.5 and -1.5 chunk lengths
        let a = grid.to_chunk_coord(Vec3::new(-8.0, -8.0, -8.0));
        let b = grid.to_chunk_coord(Vec3::new(-24.0, -24.0, -24.0));
        assert_eq!(a, ChunkCoord::new(-1, -1, -1));
        assert_eq!(b, ChunkCoord::new(-2, -2, -2));
        assert!(b < a);

        // Just below zero must not truncate to chunk 0
        assert_eq!(
            grid.to_chunk_coord(Vec3::new(-0.001, 0.0, 0.0)),
            ChunkCoord::new(-1, 0, 0)
        );
    }

    #[test]
    fn test_voxel_offset_negative() {
        let grid = grid16();
        let (chunk, local) = grid.to_voxel_offset(IVec3::new(-1, -16, -17));
        assert_eq!(chunk, ChunkCoord::new(-1, -1, -2));
        assert_eq!(local, IVec3::new(15, 0, 15));
    }

    #[test]
    fn test_voxel_offset_inverse() {
        let grid = grid16();
        for &world in &[
            IVec3::new(0, 0, 0),
            IVec3::new(31, -1, 100),
            IVec3::new(-33, 47, -16),
        ] {
            let (chunk, local) = grid.to_voxel_offset(world);
            assert!(local_index(local, 16).is_some(), "{local:?} outside chunk");
            assert_eq!(grid.chunk_origin(chunk).expect("in range") + local, world);
        }
    }

    #[test]
    fn test_to_voxel_floors() {
        let grid = grid16();
        assert_eq!(grid.to_voxel(Vec3::new(1.9, -0.1, -1.0)), IVec3::new(1, -1, -1));
    }

    #[test]
    fn test_local_index_layout() {
        assert_eq!(local_index(IVec3::new(0, 0, 0), 4), Some(0));
        assert_eq!(local_index(IVec3::new(1, 0, 0), 4), Some(1));
        assert_eq!(local_index(IVec3::new(0, 1, 0), 4), Some(4));
        assert_eq!(local_index(IVec3::new(0, 0, 1), 4), Some(16));
        assert_eq!(local_index(IVec3::new(3, 3, 3), 4), Some(63));
        assert_eq!(local_index(IVec3::new(4, 0, 0), 4), None);
        assert_eq!(local_index(IVec3::new(0, -1, 0), 4), None);
        assert_eq!(ChunkGrid::new(4).expect("valid edge").volume(), 64);
    }

    #[test]
    fn test_far_positions_clamp_consistently() {
        let grid = grid16();
        for position in [
            Vec3::new(3.0e9, 0.5, 0.5),
            Vec3::new(-1.0e12, 0.0, 7.0),
            Vec3::splat(f32::MAX),
            Vec3::new(f32::NEG_INFINITY, f32::NAN, 0.0),
        ] {
            let voxel = grid.to_voxel(position);
            assert!(voxel.cmpge(IVec3::splat(-MAX_WORLD_COORD)).all());
            assert!(voxel.cmplt(IVec3::splat(MAX_WORLD_COORD)).all());
            // The observer's chunk owns the voxel at the same position.
            assert_eq!(grid.to_chunk_coord(position), grid.to_voxel_offset(voxel).0);
        }
        assert_eq!(
            grid.to_voxel(Vec3::new(3.0e9, 0.5, 0.5)),
            IVec3::new(MAX_WORLD_COORD - 1, 0, 0)
        );
    }

    #[test]
    fn test_chunk_origin_range() {
        let grid = grid16();
        assert_eq!(
            grid.chunk_origin(ChunkCoord::new(-2, 0, 3)),
            Some(IVec3::new(-32, 0, 48))
        );
        assert_eq!(grid.chunk_origin(ChunkCoord::new(i32::MAX / 16 + 1, 0, 0)), None);
        assert_eq!(grid.chunk_origin(ChunkCoord::new(0, i32::MIN, 0)), None);
        // Last chunk whose far corner still fits.
        let last = ChunkCoord::new(i32::MAX / 16, 0, 0);
        assert!(grid.chunk_origin(last).is_some());
    }

    #[test]
    fn test_camera_to_world_is_explicit() {
        let world = camera_to_world(Vec3::new(32.0, -4.0, 2.0), 2.0);
        assert_eq!(world, Vec3::new(16.0, -2.0, 1.0));
        assert_eq!(grid16().to_chunk_coord(world), ChunkCoord::new(1, -1, 0));
    }
}
