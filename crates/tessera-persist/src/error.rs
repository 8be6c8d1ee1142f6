/// Errors that can occur while encoding, decoding or storing chunk records.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("invalid magic bytes (expected {expected:?})")]
    InvalidMagic { expected: [u8; 4] },

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    #[error("truncated data: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("LZ4 decompression failed: {0}")]
    DecompressError(String),

    #[error("invalid chunk edge {edge} (must be between 1 and {max})")]
    InvalidEdge { edge: u16, max: i32 },

    #[error("invalid chunk size: expected {expected} bytes, got {actual}")]
    InvalidChunkSize { expected: usize, actual: usize },

    #[error("invalid fill record (expected 2 bytes, got {0})")]
    InvalidFill(usize),

    #[error("invalid chunk: {0}")]
    InvalidChunk(#[from] tessera_world::chunk::ChunkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
