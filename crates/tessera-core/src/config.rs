use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_VIEW_DISTANCE, MAX_CHUNK_SIZE, MAX_VIEW_DISTANCE,
};
use crate::error::ConfigError;
use crate::math::ChunkGrid;
use crate::types::ChunkCoord;

/// Distance metric that decides which chunks around the observer are wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowShape {
    /// Chebyshev distance: a cube of side `2d+1`.
    #[default]
    Cube,
    /// Euclidean distance: chunks whose squared distance is at most `d^2`.
    Sphere,
}

impl WindowShape {
    /// Whether `coord` lies inside a window of radius `distance` around `center`.
    pub fn contains(self, center: ChunkCoord, coord: ChunkCoord, distance: i32) -> bool {
        match self {
            WindowShape::Cube => center.chebyshev_distance(coord) <= distance,
            WindowShape::Sphere => {
                let r = distance as i64;
                center.distance_squared(coord) <= r * r
            }
        }
    }
}

/// Runtime configuration for a chunk view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Radius of the view window in chunks, measured from the observer's chunk.
    pub view_distance: i32,
    /// Chunk edge length in voxels.
    pub chunk_size: i32,
    pub shape: WindowShape,
    /// Cap on storage load requests issued per tick. `None` loads the whole
    /// window in a single tick.
    pub max_loads_per_tick: Option<usize>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            view_distance: DEFAULT_VIEW_DISTANCE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            shape: WindowShape::Cube,
            max_loads_per_tick: None,
        }
    }
}

impl ViewConfig {
    pub fn with_view_distance(view_distance: i32) -> Self {
        Self {
            view_distance,
            ..Self::default()
        }
    }

    /// Parse a config from a RON string. Missing fields take their defaults.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let config: ViewConfig = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would produce undefined window sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_VIEW_DISTANCE).contains(&self.view_distance) {
            return Err(ConfigError::InvalidViewDistance(self.view_distance));
        }
        if self.chunk_size < 1 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::InvalidChunkSize {
                actual: self.chunk_size,
                max: MAX_CHUNK_SIZE,
            });
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<ChunkGrid, ConfigError> {
        ChunkGrid::new(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ViewConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_view_distance() {
        let config = ViewConfig::with_view_distance(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidViewDistance(0)));
    }

    #[test]
    fn test_rejects_view_distance_above_limit() {
        let config = ViewConfig::with_view_distance(MAX_VIEW_DISTANCE);
        assert!(config.validate().is_ok());

        for distance in [MAX_VIEW_DISTANCE + 1, i32::MAX] {
            let config = ViewConfig::with_view_distance(distance);
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidViewDistance(distance))
            );
        }
        assert!(ViewConfig::from_ron_str("(view_distance: 100000)").is_err());
    }

    #[test]
    fn test_rejects_bad_chunk_size() {
        for size in [0, -16, MAX_CHUNK_SIZE + 1] {
            let config = ViewConfig {
                chunk_size: size,
                ..ViewConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidChunkSize { .. })),
                "chunk size {size} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_ron_with_defaults() {
        let config = ViewConfig::from_ron_str("(view_distance: 4, shape: Sphere)")
            .expect("config should parse");
        assert_eq!(config.view_distance, 4);
        assert_eq!(config.shape, WindowShape::Sphere);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.max_loads_per_tick, None);
    }

    #[test]
    fn test_parse_ron_budget() {
        let config = ViewConfig::from_ron_str("(max_loads_per_tick: Some(8))")
            .expect("config should parse");
        assert_eq!(config.max_loads_per_tick, Some(8));
    }

    #[test]
    fn test_parse_ron_validates() {
        let err = ViewConfig::from_ron_str("(view_distance: -2)").unwrap_err();
        assert_eq!(err, ConfigError::InvalidViewDistance(-2));

        let err = ViewConfig::from_ron_str("(view_distance: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_window_shapes() {
        let c = ChunkCoord::ORIGIN;
        let corner = ChunkCoord::new(2, 2, 2);
        assert!(WindowShape::Cube.contains(c, corner, 2));
        assert!(!WindowShape::Sphere.contains(c, corner, 2));
        assert!(WindowShape::Sphere.contains(c, ChunkCoord::new(0, 2, 0), 2));
        assert!(!WindowShape::Cube.contains(c, ChunkCoord::new(0, 3, 0), 2));
    }
}
