pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod math;
pub mod types;

pub use config::{ViewConfig, WindowShape};
pub use error::ConfigError;
pub use math::ChunkGrid;
pub use types::{BlockId, ChunkCoord, WorldCoord};
