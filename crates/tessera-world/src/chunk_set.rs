use crate::chunk::Chunk;
use tessera_core::types::ChunkCoord;
use std::collections::BTreeMap;

/// The chunks currently loaded around the observer, keyed by coordinate.
///
/// A coordinate maps to at most one chunk. Iteration follows coordinate order,
/// so consumers see the same sequence every frame.
#[derive(Debug, Default)]
pub struct ActiveChunkSet {
    chunks: BTreeMap<ChunkCoord, Chunk>,
}

impl ActiveChunkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chunk under its own coordinate.
    ///
    /// If the coordinate is already occupied the set is left untouched and the
    /// rejected chunk is handed back.
    pub(crate) fn insert(&mut self, chunk: Chunk) -> Result<(), Chunk> {
        let coord = chunk.coord();
        if self.chunks.contains_key(&coord) {
            return Err(chunk);
        }
        self.chunks.insert(coord, chunk);
        Ok(())
    }

    /// Remove a chunk, returning ownership of it.
    pub(crate) fn remove(&mut self, coord: &ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(coord)
    }

    /// Take every chunk out of the set, in coordinate order.
    pub(crate) fn drain(&mut self) -> Vec<(ChunkCoord, Chunk)> {
        std::mem::take(&mut self.chunks).into_iter().collect()
    }

    /// Get a chunk by coordinate.
    pub fn get(&self, coord: &ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(coord)
    }

    /// Get a mutable chunk by coordinate. Membership cannot change through this.
    pub fn get_mut(&mut self, coord: &ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(coord)
    }

    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.chunks.contains_key(coord)
    }

    /// Iterator over all loaded chunks in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    /// Mutable iterator over all loaded chunks in coordinate order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ChunkCoord, &mut Chunk)> {
        self.chunks.iter_mut()
    }

    /// Loaded coordinates in order.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::types::BlockId;

    fn chunk(x: i32, y: i32, z: i32) -> Chunk {
        Chunk::empty(ChunkCoord::new(x, y, z), 4).expect("chunk")
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut set = ActiveChunkSet::new();
        assert!(set.insert(chunk(1, 1, 1)).is_ok());

        let mut second = chunk(1, 1, 1);
        second.set(glam::IVec3::ZERO, BlockId(9));
        let rejected = set.insert(second).expect_err("duplicate must be rejected");
        assert_eq!(rejected.get(glam::IVec3::ZERO), Some(BlockId(9)));

        // Original survives untouched
        assert_eq!(set.len(), 1);
        let kept = set.get(&ChunkCoord::new(1, 1, 1)).expect("chunk exists");
        assert_eq!(kept.get(glam::IVec3::ZERO), Some(BlockId::AIR));
    }

    #[test]
    fn test_iteration_is_coordinate_ordered() {
        let mut set = ActiveChunkSet::new();
        for c in [chunk(2, 0, 0), chunk(-1, 3, 0), chunk(0, 0, 1), chunk(0, 0, -1)] {
            set.insert(c).expect("unique");
        }
        let coords: Vec<_> = set.coords().collect();
        let mut sorted = coords.clone();
        sorted.sort();
        assert_eq!(coords, sorted);
        assert_eq!(coords[0], ChunkCoord::new(-1, 3, 0));
    }

    #[test]
    fn test_remove_and_drain() {
        let mut set = ActiveChunkSet::new();
        set.insert(chunk(0, 0, 0)).expect("unique");
        set.insert(chunk(1, 0, 0)).expect("unique");

        let removed = set.remove(&ChunkCoord::new(0, 0, 0)).expect("present");
        assert_eq!(removed.coord(), ChunkCoord::ORIGIN);
        assert!(!set.contains(&ChunkCoord::ORIGIN));
        assert!(set.remove(&ChunkCoord::ORIGIN).is_none());

        let drained = set.drain();
        assert_eq!(drained.len(), 1);
        assert!(set.is_empty());
    }
}
