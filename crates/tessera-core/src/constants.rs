//! Shared defaults and limits for the chunk window.

/// Default side length of a chunk in voxels.
pub const DEFAULT_CHUNK_SIZE: i32 = 16;

/// Largest accepted chunk edge. Keeps `edge^3` voxel counts well inside `usize`
/// on 32-bit targets and voxel indices inside `i32` arithmetic.
pub const MAX_CHUNK_SIZE: i32 = 256;

/// Default view distance in chunks, measured from the observer's chunk.
pub const DEFAULT_VIEW_DISTANCE: i32 = 1;

/// Largest accepted view distance. A full cube window at this radius holds
/// 65^3 chunks.
pub const MAX_VIEW_DISTANCE: i32 = 32;

/// Voxel positions are clamped to `-MAX_WORLD_COORD..MAX_WORLD_COORD` on every
/// axis. Chunk coordinates inside this range stay representable after adding a
/// full view distance and multiplying back by the chunk edge.
pub const MAX_WORLD_COORD: i32 = 1 << 30;

/// Camera units per voxel edge when the renderer draws voxels at unit scale.
pub const DEFAULT_UNITS_PER_VOXEL: f32 = 1.0;

/// Raw value of the empty block.
pub const AIR_ID: u16 = 0;

/// Raw value reserved for queries into space with no loaded chunk.
pub const OUT_OF_BOUNDS_ID: u16 = u16::MAX;
