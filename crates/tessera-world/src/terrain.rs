use crate::chunk::{Chunk, ChunkError};
use crate::storage::{ChunkGenerator, StorageError};
use glam::IVec3;
use tessera_core::math::ChunkGrid;
use tessera_core::types::{BlockId, ChunkCoord};

// Block IDs produced by the built-in generators.
pub const STONE: BlockId = BlockId(1);
pub const DIRT: BlockId = BlockId(2);
pub const GRASS: BlockId = BlockId(3);
pub const WATER: BlockId = BlockId(4);

/// Sea level in world-space voxel Y coordinate.
pub const SEA_LEVEL: i32 = 0;

/// Depth of the dirt layer under the surface block.
const DIRT_DEPTH: i32 = 3;

/// Heightmap terrain from seeded 2D simplex noise.
///
/// Columns are stone up to a few voxels below the surface, then dirt, then a
/// grass cap. Air below `SEA_LEVEL` is flooded with water.
pub struct TerrainGenerator {
    /// Permutation table (doubled for wrapping).
    perm: [u8; 512],
}

impl TerrainGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            perm: permutation(seed),
        }
    }

    /// Surface height at a world-space (x, z) column, 3 octaves.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let (x, z) = (wx as f64, wz as f64);
        let octaves = [(0.01, 16.0, 0.0), (0.02, 8.0, 100.0), (0.04, 4.0, 200.0)];
        let h: f64 = octaves
            .iter()
            .map(|&(freq, amp, shift)| self.simplex2d(x * freq + shift, z * freq + shift) * amp)
            .sum();
        (SEA_LEVEL as f64 + 2.0 + h).round() as i32
    }

    fn block_for(&self, wy: i32, height: i32) -> BlockId {
        if wy > height {
            if wy <= SEA_LEVEL {
                WATER
            } else {
                BlockId::AIR
            }
        } else if wy == height {
            if height < SEA_LEVEL {
                DIRT
            } else {
                GRASS
            }
        } else if wy > height - DIRT_DEPTH {
            DIRT
        } else {
            STONE
        }
    }

    /// 2D simplex noise in [-1, 1].
    fn simplex2d(&self, x: f64, z: f64) -> f64 {
        const F2: f64 = 0.366_025_403_784_438_6; // (sqrt(3)-1)/2
        const G2: f64 = 0.211_324_865_405_187_1; // (3-sqrt(3))/6

        let skew = (x + z) * F2;
        let cell = ((x + skew).floor(), (z + skew).floor());
        let unskew = (cell.0 + cell.1) * G2;
        let p0 = (x - (cell.0 - unskew), z - (cell.1 - unskew));

        let step = if p0.0 > p0.1 { (1, 0) } else { (0, 1) };
        let p1 = (p0.0 - step.0 as f64 + G2, p0.1 - step.1 as f64 + G2);
        let p2 = (p0.0 - 1.0 + 2.0 * G2, p0.1 - 1.0 + 2.0 * G2);

        let ci = (cell.0 as i64 & 255) as usize;
        let cj = (cell.1 as i64 & 255) as usize;
        let hash = |di: usize, dj: usize| self.perm[ci + di + self.perm[cj + dj] as usize] as usize;

        let sum = corner(hash(0, 0), p0)
            + corner(hash(step.0, step.1), p1)
            + corner(hash(1, 1), p2);
        70.0 * sum
    }
}

impl ChunkGenerator for TerrainGenerator {
    fn generate(&self, coord: ChunkCoord, edge: i32) -> Result<Chunk, StorageError> {
        let (e, origin) = chunk_frame(coord, edge)?;
        let mut blocks = vec![BlockId::AIR; e * e * e];

        for lz in 0..edge {
            for lx in 0..edge {
                let height = self.surface_height(origin.x + lx, origin.z + lz);
                for ly in 0..edge {
                    let idx = lx as usize + ly as usize * e + lz as usize * e * e;
                    blocks[idx] = self.block_for(origin.y + ly, height);
                }
            }
        }

        Chunk::from_blocks(coord, edge, blocks).map_err(|e| StorageError::from_chunk(coord, e))
    }
}

/// Solid `block` at and below `surface_y`, air above. Useful for tests and
/// benchmarks where terrain shape does not matter.
pub struct FlatGenerator {
    surface_y: i32,
    block: BlockId,
}

impl FlatGenerator {
    pub fn new(surface_y: i32, block: BlockId) -> Self {
        Self { surface_y, block }
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, coord: ChunkCoord, edge: i32) -> Result<Chunk, StorageError> {
        let (e, origin) = chunk_frame(coord, edge)?;
        let base_y = origin.y;
        let fill = |b| Chunk::filled(coord, edge, b).map_err(|e| StorageError::from_chunk(coord, e));
        if base_y > self.surface_y {
            return fill(BlockId::AIR);
        }
        if base_y + edge - 1 <= self.surface_y {
            return fill(self.block);
        }

        let mut blocks = vec![BlockId::AIR; e * e * e];
        for (i, slot) in blocks.iter_mut().enumerate() {
            let ly = ((i / e) % e) as i32;
            if base_y + ly <= self.surface_y {
                *slot = self.block;
            }
        }
        Chunk::from_blocks(coord, edge, blocks).map_err(|e| StorageError::from_chunk(coord, e))
    }
}

/// Edge as `usize` and world-space origin of the chunk to generate.
fn chunk_frame(coord: ChunkCoord, edge: i32) -> Result<(usize, IVec3), StorageError> {
    let grid = ChunkGrid::new(edge)
        .map_err(|_| StorageError::from_chunk(coord, ChunkError::InvalidEdge(edge)))?;
    let origin = grid.chunk_origin(coord).ok_or_else(|| StorageError::Generation {
        coord,
        reason: "chunk lies outside the representable world".to_string(),
    })?;
    Ok((edge as usize, origin))
}

fn corner(hash: usize, (x, y): (f64, f64)) -> f64 {
    const GRAD: [(f64, f64); 8] = [
        (1.0, 1.0),
        (-1.0, 1.0),
        (1.0, -1.0),
        (-1.0, -1.0),
        (1.0, 0.0),
        (-1.0, 0.0),
        (0.0, 1.0),
        (0.0, -1.0),
    ];
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let g = GRAD[hash % GRAD.len()];
    t.powi(4) * (g.0 * x + g.1 * y)
}

fn permutation(seed: u64) -> [u8; 512] {
    let mut p: [u8; 256] = std::array::from_fn(|i| i as u8);

    // Fisher-Yates with a 64-bit LCG
    let mut rng = seed;
    for i in (1..256).rev() {
        rng = rng
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (rng >> 33) as usize % (i + 1);
        p.swap(i, j);
    }

    std::array::from_fn(|i| p[i & 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_deterministic() {
        let gen = TerrainGenerator::new(42);
        let coord = ChunkCoord::new(3, 0, -2);
        let a = gen.generate(coord, 16).expect("generate");
        let b = gen.generate(coord, 16).expect("generate");
        assert_eq!(a.blocks(), b.blocks(), "terrain generation must be deterministic");
        assert!(!a.is_modified());
    }

    #[test]
    fn test_seeds_differ() {
        let a = TerrainGenerator::new(1);
        let b = TerrainGenerator::new(2);
        let differs = (0..64).any(|x| a.surface_height(x * 7, x * 3) != b.surface_height(x * 7, x * 3));
        assert!(differs, "different seeds should produce different terrain");
    }

    #[test]
    fn test_deep_chunk_is_stone_and_sky_is_air() {
        let gen = TerrainGenerator::new(42);
        let deep = gen.generate(ChunkCoord::new(0, -8, 0), 16).expect("generate");
        assert_eq!(deep.uniform_block(), Some(STONE));

        let sky = gen.generate(ChunkCoord::new(0, 8, 0), 16).expect("generate");
        assert_eq!(sky.uniform_block(), Some(BlockId::AIR));
    }

    #[test]
    fn test_column_layers() {
        let gen = TerrainGenerator::new(7);
        let height = 10;
        assert_eq!(gen.block_for(height + 1, height), BlockId::AIR);
        assert_eq!(gen.block_for(height, height), GRASS);
        assert_eq!(gen.block_for(height - 1, height), DIRT);
        assert_eq!(gen.block_for(height - DIRT_DEPTH, height), STONE);

        // Underwater column
        assert_eq!(gen.block_for(SEA_LEVEL, -5), WATER);
        assert_eq!(gen.block_for(-5, -5), DIRT);
    }

    #[test]
    fn test_never_emits_sentinel() {
        let gen = TerrainGenerator::new(42);
        let chunk = gen.generate(ChunkCoord::new(-1, 0, 1), 8).expect("generate");
        assert!(chunk.blocks().iter().all(|b| !b.is_out_of_bounds()));
    }

    #[test]
    fn test_unrepresentable_chunk_is_an_error() {
        let far = ChunkCoord::new(i32::MAX, 0, i32::MIN);
        let terrain = TerrainGenerator::new(3).generate(far, 16);
        assert!(matches!(terrain, Err(StorageError::Generation { coord, .. }) if coord == far));

        let flat = FlatGenerator::new(0, STONE).generate(ChunkCoord::new(0, i32::MAX, 0), 16);
        assert!(matches!(flat, Err(StorageError::Generation { .. })));
        assert!(FlatGenerator::new(0, STONE).generate(ChunkCoord::ORIGIN, 0).is_err());
    }

    #[test]
    fn test_flat_generator_split_chunk() {
        let gen = FlatGenerator::new(1, STONE);
        let chunk = gen.generate(ChunkCoord::ORIGIN, 4).expect("generate");
        assert_eq!(chunk.get(IVec3::new(2, 0, 3)), Some(STONE));
        assert_eq!(chunk.get(IVec3::new(2, 1, 3)), Some(STONE));
        assert_eq!(chunk.get(IVec3::new(2, 2, 3)), Some(BlockId::AIR));

        let below = gen.generate(ChunkCoord::new(0, -1, 0), 4).expect("generate");
        assert_eq!(below.uniform_block(), Some(STONE));
        let above = gen.generate(ChunkCoord::new(0, 1, 0), 4).expect("generate");
        assert_eq!(above.uniform_block(), Some(BlockId::AIR));
    }
}
