use crate::chunk_set::ActiveChunkSet;
use tessera_core::direction::Face;
use tessera_core::math::ChunkGrid;
use tessera_core::types::{BlockId, WorldCoord};

/// Read the block at a world voxel position.
///
/// Positions whose chunk is not loaded read as `BlockId::OUT_OF_BOUNDS`.
/// Querying outside the window is legitimate and never fails.
pub fn block_at(chunks: &ActiveChunkSet, grid: &ChunkGrid, world: WorldCoord) -> BlockId {
    let (coord, local) = grid.to_voxel_offset(world);
    chunks
        .get(&coord)
        .and_then(|chunk| chunk.get(local))
        .unwrap_or(BlockId::OUT_OF_BOUNDS)
}

/// Write the block at a world voxel position.
///
/// Returns false, changing nothing, when the owning chunk is not loaded or when
/// `block` is the out-of-bounds sentinel. A changed voxel marks its chunk dirty,
/// plus every loaded face neighbor whose shared face the voxel touches.
pub fn set_block_at(
    chunks: &mut ActiveChunkSet,
    grid: &ChunkGrid,
    world: WorldCoord,
    block: BlockId,
) -> bool {
    if block.is_out_of_bounds() {
        log::warn!("Refusing to store the out-of-bounds sentinel at {}", world);
        return false;
    }

    let (coord, local) = grid.to_voxel_offset(world);
    let Some(chunk) = chunks.get_mut(&coord) else {
        return false;
    };
    let Some(previous) = chunk.set(local, block) else {
        return false;
    };

    if previous != block {
        for face in Face::touching(local, grid.edge()) {
            if let Some(neighbor) = chunks.get_mut(&(coord + face.offset())) {
                neighbor.mark_dirty();
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use glam::IVec3;
    use tessera_core::types::ChunkCoord;

    fn clean_set(coords: &[ChunkCoord], edge: i32) -> ActiveChunkSet {
        let mut set = ActiveChunkSet::new();
        for &c in coords {
            set.insert(Chunk::empty(c, edge).expect("chunk")).expect("unique");
        }
        for (_, chunk) in set.iter_mut() {
            chunk.take_dirty();
        }
        set
    }

    #[test]
    fn test_round_trip_negative_position() {
        let grid = ChunkGrid::new(16).expect("grid");
        let mut set = clean_set(&[ChunkCoord::new(-1, -1, -1)], 16);
        let pos = IVec3::new(-3, -16, -9);

        assert_eq!(block_at(&set, &grid, pos), BlockId::AIR);
        assert!(set_block_at(&mut set, &grid, pos, BlockId(12)));
        assert_eq!(block_at(&set, &grid, pos), BlockId(12));

        let chunk = set.get(&ChunkCoord::new(-1, -1, -1)).expect("loaded");
        assert!(chunk.is_dirty());
        assert_eq!(chunk.get(IVec3::new(13, 0, 7)), Some(BlockId(12)));
    }

    #[test]
    fn test_unloaded_reads_sentinel_and_write_is_noop() {
        let grid = ChunkGrid::new(16).expect("grid");
        let mut set = clean_set(&[ChunkCoord::ORIGIN], 16);
        let outside = IVec3::new(16, 0, 0);

        assert_eq!(block_at(&set, &grid, outside), BlockId::OUT_OF_BOUNDS);
        assert!(!set_block_at(&mut set, &grid, outside, BlockId(1)));
        assert_eq!(set.len(), 1);
        assert!(set.iter().all(|(_, chunk)| !chunk.is_dirty() && !chunk.is_modified()));
    }

    #[test]
    fn test_sentinel_write_rejected() {
        let grid = ChunkGrid::new(16).expect("grid");
        let mut set = clean_set(&[ChunkCoord::ORIGIN], 16);
        assert!(!set_block_at(&mut set, &grid, IVec3::ONE, BlockId::OUT_OF_BOUNDS));
        assert_eq!(block_at(&set, &grid, IVec3::ONE), BlockId::AIR);
    }

    #[test]
    fn test_boundary_write_dirties_neighbor() {
        let grid = ChunkGrid::new(8).expect("grid");
        let west = ChunkCoord::new(-1, 0, 0);
        let above = ChunkCoord::new(0, 1, 0);
        let mut set = clean_set(&[ChunkCoord::ORIGIN, west, above], 8);

        // x = 0 face borders the west chunk
        assert!(set_block_at(&mut set, &grid, IVec3::new(0, 3, 3), BlockId(4)));
        assert!(set.get(&ChunkCoord::ORIGIN).expect("loaded").is_dirty());
        assert!(set.get(&west).expect("loaded").is_dirty());
        assert!(!set.get(&above).expect("loaded").is_dirty());
    }

    #[test]
    fn test_interior_and_unchanged_writes_leave_neighbors_clean() {
        let grid = ChunkGrid::new(8).expect("grid");
        let east = ChunkCoord::new(1, 0, 0);
        let mut set = clean_set(&[ChunkCoord::ORIGIN, east], 8);

        assert!(set_block_at(&mut set, &grid, IVec3::new(4, 4, 4), BlockId(4)));
        assert!(!set.get(&east).expect("loaded").is_dirty());

        // Same value already present on the east face: accepted, nothing dirtied
        for (_, chunk) in set.iter_mut() {
            chunk.take_dirty();
        }
        assert!(set_block_at(&mut set, &grid, IVec3::new(7, 0, 0), BlockId::AIR));
        assert!(set.iter().all(|(_, chunk)| !chunk.is_dirty()));
    }
}
