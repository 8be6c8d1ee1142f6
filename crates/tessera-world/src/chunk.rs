use glam::IVec3;
use tessera_core::math::{local_index, ChunkGrid};
use tessera_core::types::{BlockId, ChunkCoord};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk voxel count mismatch: expected {expected}, got {actual}")]
    WrongVoxelCount { expected: usize, actual: usize },

    #[error("invalid chunk edge {0}")]
    InvalidEdge(i32),

    #[error("the out-of-bounds sentinel cannot be stored in a chunk")]
    SentinelBlock,
}

/// A cube of `edge^3` voxels plus the metadata the chunk view tracks for it.
///
/// Voxels are stored flat, indexed `x + y*edge + z*edge^2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    coord: ChunkCoord,
    edge: i32,
    blocks: Vec<BlockId>,
    /// Render geometry is stale. New chunks start dirty.
    dirty: bool,
    /// Voxels differ from what storage produced.
    modified: bool,
}

impl Chunk {
    /// Create a chunk with every voxel set to `block`.
    pub fn filled(coord: ChunkCoord, edge: i32, block: BlockId) -> Result<Self, ChunkError> {
        let volume = volume(edge)?;
        if block.is_out_of_bounds() {
            return Err(ChunkError::SentinelBlock);
        }
        Ok(Self {
            coord,
            edge,
            blocks: vec![block; volume],
            dirty: true,
            modified: false,
        })
    }

    /// Create an all-air chunk.
    pub fn empty(coord: ChunkCoord, edge: i32) -> Result<Self, ChunkError> {
        Self::filled(coord, edge, BlockId::AIR)
    }

    /// Wrap existing voxel data. `blocks.len()` must equal `edge^3` and no
    /// voxel may hold the out-of-bounds sentinel.
    pub fn from_blocks(
        coord: ChunkCoord,
        edge: i32,
        blocks: Vec<BlockId>,
    ) -> Result<Self, ChunkError> {
        let expected = volume(edge)?;
        if blocks.len() != expected {
            return Err(ChunkError::WrongVoxelCount {
                expected,
                actual: blocks.len(),
            });
        }
        if blocks.iter().any(|b| b.is_out_of_bounds()) {
            return Err(ChunkError::SentinelBlock);
        }
        Ok(Self {
            coord,
            edge,
            blocks,
            dirty: true,
            modified: false,
        })
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn edge(&self) -> i32 {
        self.edge
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Block at a local offset. None if the offset is outside the chunk.
    pub fn get(&self, local: IVec3) -> Option<BlockId> {
        local_index(local, self.edge).map(|i| self.blocks[i])
    }

    /// Write a block at a local offset.
    ///
    /// Returns the previous block, or None if the offset is outside the chunk
    /// or `block` is the out-of-bounds sentinel. Marks the chunk dirty and
    /// modified only when the value actually changes.
    pub fn set(&mut self, local: IVec3, block: BlockId) -> Option<BlockId> {
        if block.is_out_of_bounds() {
            return None;
        }
        let idx = local_index(local, self.edge)?;
        let previous = std::mem::replace(&mut self.blocks[idx], block);
        if previous != block {
            self.dirty = true;
            self.modified = true;
        }
        Some(previous)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The single block filling the whole chunk, if the chunk is uniform.
    pub fn uniform_block(&self) -> Option<BlockId> {
        let first = *self.blocks.first()?;
        self.blocks.iter().all(|&b| b == first).then_some(first)
    }
}

fn volume(edge: i32) -> Result<usize, ChunkError> {
    ChunkGrid::new(edge)
        .map(|grid| grid.volume())
        .map_err(|_| ChunkError::InvalidEdge(edge))
}
