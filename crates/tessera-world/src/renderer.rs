use crate::chunk::Chunk;
use crate::chunk_set::ActiveChunkSet;
use tessera_core::types::ChunkCoord;

/// The rendering collaborator driven by a chunk view.
///
/// A renderer never owns chunks. It sees them only as borrows for the duration
/// of a callback, and addresses them afterwards by coordinate through the
/// read-only set passed to `draw_all`. A coordinate missing from that set means
/// the chunk was unloaded.
pub trait ChunkRenderer {
    /// A chunk entered the view. Geometry is built on the next `on_chunk_dirty`.
    fn on_chunk_loaded(&mut self, coord: ChunkCoord, chunk: &Chunk);

    /// A chunk left the view. Drop any geometry derived from it.
    fn on_chunk_unloaded(&mut self, coord: ChunkCoord);

    /// A chunk's voxels changed (or it is new). Rebuild its drawable data.
    fn on_chunk_dirty(&mut self, coord: ChunkCoord, chunk: &Chunk);

    /// Submit every loaded chunk for drawing.
    fn draw_all(&mut self, chunks: &ActiveChunkSet);
}

/// Renderer that ignores every notification. For headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ChunkRenderer for NullRenderer {
    fn on_chunk_loaded(&mut self, _coord: ChunkCoord, _chunk: &Chunk) {}

    fn on_chunk_unloaded(&mut self, _coord: ChunkCoord) {}

    fn on_chunk_dirty(&mut self, _coord: ChunkCoord, _chunk: &Chunk) {}

    fn draw_all(&mut self, _chunks: &ActiveChunkSet) {}
}
