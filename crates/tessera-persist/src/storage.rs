use tessera_core::types::ChunkCoord;
use tessera_world::chunk::Chunk;
use tessera_world::storage::{LoadOutcome, StorageError, WorldStorage};

use crate::store::ChunkStore;

/// World storage that keeps edited chunks.
///
/// Chunks modified while in view are encoded into a `ChunkStore` when they are
/// unloaded and served from it on the next load. Everything else is delegated to
/// the wrapped storage, so untouched chunks are regenerated rather than stored.
pub struct PersistentStorage<S> {
    inner: S,
    store: ChunkStore,
    saved: u64,
    restored: u64,
}

impl<S: WorldStorage> PersistentStorage<S> {
    pub fn new(inner: S) -> Self {
        Self::with_store(inner, ChunkStore::new())
    }

    /// Resume from a previously saved store.
    pub fn with_store(inner: S, store: ChunkStore) -> Self {
        Self {
            inner,
            store,
            saved: 0,
            restored: 0,
        }
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get counts: (saved, restored)
    pub fn counts(&self) -> (u64, u64) {
        (self.saved, self.restored)
    }

    pub fn into_parts(self) -> (S, ChunkStore) {
        (self.inner, self.store)
    }
}

impl<S: WorldStorage> WorldStorage for PersistentStorage<S> {
    fn load(&mut self, coord: ChunkCoord, edge: i32) -> Result<LoadOutcome, StorageError> {
        let Some(stored) = self.store.get(&coord) else {
            return self.inner.load(coord, edge);
        };
        let chunk = stored.map_err(|e| StorageError::Corrupt(format!("chunk {coord}: {e}")))?;
        if chunk.edge() != edge {
            return Err(StorageError::Mismatch {
                expected: coord,
                expected_edge: edge,
                actual: chunk.coord(),
                actual_edge: chunk.edge(),
            });
        }
        self.restored += 1;
        log::debug!("Restored chunk {} from store", coord);
        Ok(LoadOutcome::Ready(chunk))
    }

    fn unload(&mut self, coord: ChunkCoord, chunk: Chunk) {
        if chunk.is_modified() {
            let size = self.store.put(&chunk);
            self.saved += 1;
            log::debug!("Stored modified chunk {} ({} bytes)", coord, size);
        } else {
            self.inner.unload(coord, chunk);
        }
    }

    fn poll_ready(&mut self) -> Vec<(ChunkCoord, Result<Chunk, StorageError>)> {
        self.inner.poll_ready()
    }

    fn cancel(&mut self, coord: ChunkCoord) {
        self.inner.cancel(coord);
    }
}
