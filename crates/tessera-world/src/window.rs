use glam::IVec3;
use tessera_core::config::WindowShape;
use tessera_core::constants::MAX_VIEW_DISTANCE;
use tessera_core::types::ChunkCoord;

/// The set of chunk coordinates that should be loaded around the observer.
///
/// Recomputed every tick from the observer's chunk; never stored between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    pub center: ChunkCoord,
    pub distance: i32,
    pub shape: WindowShape,
}

impl ViewWindow {
    pub fn new(center: ChunkCoord, distance: i32, shape: WindowShape) -> Self {
        Self {
            center,
            distance,
            shape,
        }
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.shape.contains(self.center, coord, self.distance)
    }

    /// Every coordinate in the window, nearest to the center first.
    /// Ties are broken by coordinate order, so the sequence is deterministic.
    ///
    /// The radius is capped at `MAX_VIEW_DISTANCE`. Near the edge of the `i32`
    /// range the window is truncated instead of wrapping.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let d = self.distance.clamp(0, MAX_VIEW_DISTANCE);
        let side = (2 * d + 1) as usize;
        let mut coords = Vec::with_capacity(side * side * side);
        for dx in -d..=d {
            for dy in -d..=d {
                for dz in -d..=d {
                    let coord = self.center + IVec3::new(dx, dy, dz);
                    if self.contains(coord) {
                        coords.push(coord);
                    }
                }
            }
        }
        let center = self.center;
        coords.sort_by_key(|c| (c.distance_squared(center), *c));
        coords.dedup();
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_window_size() {
        for d in 1..=3 {
            let window = ViewWindow::new(ChunkCoord::new(5, -2, 7), d, WindowShape::Cube);
            let side = (2 * d + 1) as usize;
            assert_eq!(window.coords().len(), side * side * side);
        }
    }

    #[test]
    fn test_nearest_first() {
        let center = ChunkCoord::new(-3, 0, 2);
        let window = ViewWindow::new(center, 2, WindowShape::Cube);
        let coords = window.coords();
        assert_eq!(coords[0], center);
        for pair in coords.windows(2) {
            assert!(pair[0].distance_squared(center) <= pair[1].distance_squared(center));
        }
    }

    #[test]
    fn test_sphere_window_excludes_corners() {
        let window = ViewWindow::new(ChunkCoord::ORIGIN, 1, WindowShape::Sphere);
        let coords = window.coords();
        // Center plus 6 face neighbors
        assert_eq!(coords.len(), 7);
        assert!(!coords.contains(&ChunkCoord::new(1, 1, 0)));
    }

    #[test]
    fn test_window_at_range_edge_truncates() {
        let center = ChunkCoord::new(i32::MAX, i32::MIN, 0);
        let window = ViewWindow::new(center, 1, WindowShape::Cube);
        let coords = window.coords();
        // Only the in-range half of each clipped axis survives: 2 * 2 * 3.
        assert_eq!(coords.len(), 12);
        assert_eq!(coords[0], center);
        assert!(coords.iter().all(|c| window.contains(*c)));
    }

    #[test]
    fn test_contains_matches_coords() {
        let window = ViewWindow::new(ChunkCoord::new(1, 1, 1), 2, WindowShape::Sphere);
        let coords = window.coords();
        for dx in -4..=4 {
            for dy in -4..=4 {
                for dz in -4..=4 {
                    let c = ChunkCoord::new(1 + dx, 1 + dy, 1 + dz);
                    assert_eq!(window.contains(c), coords.contains(&c), "{c}");
                }
            }
        }
    }
}
