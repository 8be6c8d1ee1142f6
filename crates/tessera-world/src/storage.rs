use crate::chunk::{Chunk, ChunkError};
use tessera_core::types::ChunkCoord;
use thiserror::Error;

/// Why the world storage could not produce a chunk.
///
/// All variants are treated as transient by the chunk view: the coordinate
/// stays unloaded and is requested again on a later tick.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to generate chunk {coord}: {reason}")]
    Generation { coord: ChunkCoord, reason: String },

    #[error("storage returned chunk {actual} (edge {actual_edge}) for request {expected} (edge {expected_edge})")]
    Mismatch {
        expected: ChunkCoord,
        expected_edge: i32,
        actual: ChunkCoord,
        actual_edge: i32,
    },

    #[error("corrupt chunk data: {0}")]
    Corrupt(String),

    #[error("storage worker disconnected")]
    Disconnected,
}

impl StorageError {
    pub fn from_chunk(coord: ChunkCoord, err: ChunkError) -> Self {
        StorageError::Generation {
            coord,
            reason: err.to_string(),
        }
    }
}

/// Result of asking storage for a chunk.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The chunk is fully loaded and can be inserted now.
    Ready(Chunk),
    /// The chunk will be delivered later through `poll_ready`.
    Pending,
}

/// The world-storage collaborator that produces and persists chunk contents.
///
/// A chunk view owns exactly one storage for its whole lifetime.
pub trait WorldStorage {
    /// Generate or retrieve the chunk at `coord` with edge length `edge`.
    fn load(&mut self, coord: ChunkCoord, edge: i32) -> Result<LoadOutcome, StorageError>;

    /// Take back ownership of a chunk leaving the view, to persist or discard it.
    fn unload(&mut self, coord: ChunkCoord, chunk: Chunk);

    /// Results of earlier `Pending` loads that have finished since the last call.
    fn poll_ready(&mut self) -> Vec<(ChunkCoord, Result<Chunk, StorageError>)> {
        Vec::new()
    }

    /// The view no longer wants a pending chunk. Its result may still arrive
    /// through `poll_ready` and will be discarded.
    fn cancel(&mut self, _coord: ChunkCoord) {}
}

/// Produces chunk contents for a coordinate. Implementations must be
/// deterministic for a given coordinate and edge.
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, coord: ChunkCoord, edge: i32) -> Result<Chunk, StorageError>;
}

/// Synchronous storage that generates chunks inside `load` and discards
/// them on unload.
pub struct GeneratorStorage<G> {
    generator: G,
    generated: u64,
    discarded: u64,
}

impl<G: ChunkGenerator> GeneratorStorage<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            generated: 0,
            discarded: 0,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Get counts: (generated, discarded)
    pub fn counts(&self) -> (u64, u64) {
        (self.generated, self.discarded)
    }
}

impl<G: ChunkGenerator> WorldStorage for GeneratorStorage<G> {
    fn load(&mut self, coord: ChunkCoord, edge: i32) -> Result<LoadOutcome, StorageError> {
        let chunk = self.generator.generate(coord, edge)?;
        self.generated += 1;
        Ok(LoadOutcome::Ready(chunk))
    }

    fn unload(&mut self, coord: ChunkCoord, chunk: Chunk) {
        if chunk.is_modified() {
            log::debug!("Discarding modified chunk {} (no persistence configured)", coord);
        }
        self.discarded += 1;
    }
}
