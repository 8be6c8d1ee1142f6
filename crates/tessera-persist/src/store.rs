use std::collections::BTreeMap;
use std::path::Path;

use tessera_core::types::ChunkCoord;
use tessera_world::chunk::Chunk;

use crate::compress::{decode_chunk, encode_chunk};
use crate::error::PersistError;
use crate::format::*;

/// Encoded chunk records keyed by coordinate.
///
/// Holds chunks in their compressed form while they are outside the view, and
/// can be written to or read from a single store file.
#[derive(Debug, Default)]
pub struct ChunkStore {
    records: BTreeMap<ChunkCoord, Vec<u8>>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and store a chunk, replacing any earlier record.
    /// Returns the encoded size in bytes.
    pub fn put(&mut self, chunk: &Chunk) -> usize {
        let record = encode_chunk(chunk);
        let size = record.len();
        self.records.insert(chunk.coord(), record);
        size
    }

    /// Decode the stored chunk at `coord`, if any.
    pub fn get(&self, coord: &ChunkCoord) -> Option<Result<Chunk, PersistError>> {
        self.records
            .get(coord)
            .map(|record| decode_chunk(record).map(|(chunk, _)| chunk))
    }

    pub fn remove(&mut self, coord: &ChunkCoord) -> bool {
        self.records.remove(coord).is_some()
    }

    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.records.contains_key(coord)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total encoded size of all records.
    pub fn byte_size(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Serialize the whole store: header followed by every record in coordinate order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = StoreHeader {
            magic: STORE_MAGIC,
            version: FORMAT_VERSION,
            _pad0: 0,
            record_count: self.records.len() as u32,
        };
        let mut out = Vec::with_capacity(STORE_HEADER_SIZE + self.byte_size());
        out.extend_from_slice(bytemuck::bytes_of(&header));
        for record in self.records.values() {
            out.extend_from_slice(record);
        }
        out
    }

    /// Parse a store produced by `to_bytes`. Every record is decoded once to
    /// validate it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() < STORE_HEADER_SIZE {
            return Err(PersistError::Truncated {
                expected: STORE_HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let header: StoreHeader = bytemuck::pod_read_unaligned(&bytes[..STORE_HEADER_SIZE]);
        if header.magic != STORE_MAGIC {
            return Err(PersistError::InvalidMagic {
                expected: STORE_MAGIC,
            });
        }
        if header.version != FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion(header.version));
        }

        let mut records = BTreeMap::new();
        let mut offset = STORE_HEADER_SIZE;
        for _ in 0..header.record_count {
            let (chunk, used) = decode_chunk(&bytes[offset..])?;
            records.insert(chunk.coord(), bytes[offset..offset + used].to_vec());
            offset += used;
        }
        if offset != bytes.len() {
            log::warn!(
                "Chunk store has {} trailing bytes after {} records",
                bytes.len() - offset,
                header.record_count
            );
        }
        Ok(Self { records })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes())?;
        log::info!("Saved {} chunk records to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self, PersistError> {
        let bytes = std::fs::read(path)?;
        let store = Self::from_bytes(&bytes)?;
        log::info!("Loaded {} chunk records from {}", store.len(), path.display());
        Ok(store)
    }
}
