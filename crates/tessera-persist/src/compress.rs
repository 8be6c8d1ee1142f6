use tessera_core::constants::MAX_CHUNK_SIZE;
use tessera_core::types::{BlockId, ChunkCoord};
use tessera_world::chunk::Chunk;

use crate::error::PersistError;
use crate::format::*;

/// Serialize a chunk into a self-describing record (header + payload).
///
/// Uniform chunks collapse to a 2-byte fill payload; everything else is LZ4.
pub fn encode_chunk(chunk: &Chunk) -> Vec<u8> {
    let (payload, flags) = match chunk.uniform_block() {
        Some(block) => (block.0.to_le_bytes().to_vec(), FLAG_FILL),
        None => {
            let raw: Vec<u8> = chunk
                .blocks()
                .iter()
                .flat_map(|b| b.0.to_le_bytes())
                .collect();
            (lz4_flex::compress_prepend_size(&raw), 0)
        }
    };

    let coord = chunk.coord();
    let header = RecordHeader {
        magic: RECORD_MAGIC,
        version: FORMAT_VERSION,
        edge: chunk.edge() as u16,
        coord: [coord.x, coord.y, coord.z],
        payload_len: payload.len() as u32,
        flags,
    };

    let mut out = Vec::with_capacity(RECORD_HEADER_SIZE + payload.len());
    out.extend_from_slice(bytemuck::bytes_of(&header));
    out.extend_from_slice(&payload);
    out
}

/// Parse one record from the front of `bytes`.
///
/// Returns the chunk and the number of bytes consumed. Decoded chunks start
/// dirty and unmodified, like freshly loaded ones.
///
/// Header sizes are checked before anything is allocated, so a corrupt record
/// fails with an error instead of a huge allocation.
pub fn decode_chunk(bytes: &[u8]) -> Result<(Chunk, usize), PersistError> {
    if bytes.len() < RECORD_HEADER_SIZE {
        return Err(PersistError::Truncated {
            expected: RECORD_HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    let header: RecordHeader = bytemuck::pod_read_unaligned(&bytes[..RECORD_HEADER_SIZE]);
    if header.magic != RECORD_MAGIC {
        return Err(PersistError::InvalidMagic {
            expected: RECORD_MAGIC,
        });
    }
    if header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(header.version));
    }

    let edge = header.edge as i32;
    if !(1..=MAX_CHUNK_SIZE).contains(&edge) {
        return Err(PersistError::InvalidEdge {
            edge: header.edge,
            max: MAX_CHUNK_SIZE,
        });
    }

    let end = RECORD_HEADER_SIZE.saturating_add(header.payload_len as usize);
    if bytes.len() < end {
        return Err(PersistError::Truncated {
            expected: end,
            actual: bytes.len(),
        });
    }
    let payload = &bytes[RECORD_HEADER_SIZE..end];
    let coord = ChunkCoord::new(header.coord[0], header.coord[1], header.coord[2]);

    let chunk = if header.flags & FLAG_FILL != 0 {
        if payload.len() != 2 {
            return Err(PersistError::InvalidFill(payload.len()));
        }
        let block = BlockId(u16::from_le_bytes([payload[0], payload[1]]));
        Chunk::filled(coord, edge, block)?
    } else {
        let e = edge as usize;
        let expected = e * e * e * 2;
        if payload.len() < 4 {
            return Err(PersistError::Truncated {
                expected: RECORD_HEADER_SIZE + 4,
                actual: RECORD_HEADER_SIZE + payload.len(),
            });
        }
        // lz4_flex's size-prepended layout: u32 LE uncompressed length first.
        let (size, compressed) = payload.split_at(4);
        let declared = u32::from_le_bytes([size[0], size[1], size[2], size[3]]) as usize;
        if declared != expected {
            return Err(PersistError::InvalidChunkSize {
                expected,
                actual: declared,
            });
        }
        let raw = lz4_flex::decompress(compressed, expected)
            .map_err(|e| PersistError::DecompressError(e.to_string()))?;
        if raw.len() != expected {
            return Err(PersistError::InvalidChunkSize {
                expected,
                actual: raw.len(),
            });
        }
        let blocks = raw
            .chunks_exact(2)
            .map(|b| BlockId(u16::from_le_bytes([b[0], b[1]])))
            .collect();
        Chunk::from_blocks(coord, edge, blocks)?
    };

    Ok((chunk, end))
}
