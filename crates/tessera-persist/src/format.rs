/// Magic bytes opening every chunk record.
pub const RECORD_MAGIC: [u8; 4] = *b"TSCK";

/// Magic bytes opening a chunk store file.
pub const STORE_MAGIC: [u8; 4] = *b"TSST";

/// Current record and store format version.
pub const FORMAT_VERSION: u16 = 1;

/// Record payload is a single little-endian block ID filling the whole chunk.
pub const FLAG_FILL: u32 = 1;

/// Size of a record header in bytes.
pub const RECORD_HEADER_SIZE: usize = std::mem::size_of::<RecordHeader>();

/// Size of a store file header in bytes.
pub const STORE_HEADER_SIZE: usize = std::mem::size_of::<StoreHeader>();

/// Header preceding each chunk's payload. 28 bytes, repr(C), native byte order.
///
/// The payload is either a fill block (`FLAG_FILL`) or LZ4-compressed
/// little-endian `u16` block IDs in `x + y*edge + z*edge^2` order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RecordHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub edge: u16,
    pub coord: [i32; 3],
    pub payload_len: u32,
    pub flags: u32,
}

/// Header of a chunk store file, followed by `record_count` records.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StoreHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub _pad0: u16,
    pub record_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_sizes() {
        assert_eq!(RECORD_HEADER_SIZE, 28);
        assert_eq!(STORE_HEADER_SIZE, 12);
    }
}
