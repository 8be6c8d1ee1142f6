pub mod compress;
pub mod error;
pub mod format;
pub mod storage;
pub mod store;

pub use compress::{decode_chunk, encode_chunk};
pub use error::PersistError;
pub use storage::PersistentStorage;
pub use store::ChunkStore;
