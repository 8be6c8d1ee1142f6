use std::time::Instant;

use glam::IVec3;
use tessera_core::config::ViewConfig;
use tessera_core::math::camera_to_world;
use tessera_core::types::{BlockId, ChunkCoord};
use tessera_persist::PersistentStorage;
use tessera_world::chunk::Chunk;
use tessera_world::chunk_set::ActiveChunkSet;
use tessera_world::renderer::ChunkRenderer;
use tessera_world::storage::WorldStorage;
use tessera_world::terrain::TerrainGenerator;
use tessera_world::{BackgroundStorage, ChunkView, GeneratorStorage};

use crate::scenes::SceneConfig;

/// Block placed by editing scenes. Never produced by the terrain generator.
const EDIT_BLOCK: BlockId = BlockId(7);

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub tick_count: u32,
    pub loads: u64,
    pub unloads: u64,
    pub failed: u64,
    pub rebuilds: u64,
    pub loaded_chunks: u32,
    pub saved_chunks: u64,
    pub timings: TimingSeries,
}

/// Renderer that only counts what it is asked to do.
#[derive(Debug, Default)]
pub struct CountingRenderer {
    pub rebuilds: u64,
    pub drawn: u64,
}

impl ChunkRenderer for CountingRenderer {
    fn on_chunk_loaded(&mut self, _coord: ChunkCoord, _chunk: &Chunk) {}

    fn on_chunk_unloaded(&mut self, _coord: ChunkCoord) {}

    fn on_chunk_dirty(&mut self, _coord: ChunkCoord, _chunk: &Chunk) {
        self.rebuilds += 1;
    }

    fn draw_all(&mut self, chunks: &ActiveChunkSet) {
        self.drawn += chunks.len() as u64;
    }
}

/// Drives a chunk view along scripted observer paths and times each frame.
pub struct BenchmarkRunner {
    config: ViewConfig,
    tick_count: u32,
    seed: u64,
    units_per_voxel: f32,
    background: bool,
}

impl BenchmarkRunner {
    pub fn new(config: ViewConfig, tick_count: u32, seed: u64, units_per_voxel: f32) -> Self {
        Self {
            config,
            tick_count,
            seed,
            units_per_voxel,
            background: false,
        }
    }

    /// Generate chunks on worker threads instead of inline.
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, scene: &SceneConfig) -> BenchmarkResult {
        log::info!(
            "Running scene '{}' (view distance {}, chunk size {}, {})...",
            scene.name,
            self.config.view_distance,
            self.config.chunk_size,
            if self.background { "background" } else { "inline" }
        );

        let generator = TerrainGenerator::new(self.seed);
        if self.background {
            let storage = PersistentStorage::new(BackgroundStorage::with_default_workers(generator));
            self.run_with(scene, storage)
        } else {
            let storage = PersistentStorage::new(GeneratorStorage::new(generator));
            self.run_with(scene, storage)
        }
    }

    fn run_with<S: WorldStorage>(
        &self,
        scene: &SceneConfig,
        storage: PersistentStorage<S>,
    ) -> BenchmarkResult {
        let mut view = match ChunkView::new(self.config.clone(), storage, CountingRenderer::default())
        {
            Ok(view) => view,
            Err(err) => {
                log::error!("Scene '{}' rejected config: {}", scene.name, err);
                return BenchmarkResult::empty(scene.name, self.tick_count);
            }
        };

        let mut frame_times = Vec::with_capacity(self.tick_count as usize);
        let (mut loads, mut unloads, mut failed) = (0u64, 0u64, 0u64);

        for frame in 0..self.tick_count {
            let observer = camera_to_world(scene.position_at(frame), self.units_per_voxel);

            let start = Instant::now();
            let report = view.tick(observer);
            if scene.edits {
                let target = observer.floor().as_ivec3() + edit_offset(frame);
                view.set_block(target, EDIT_BLOCK);
            }
            view.render();
            frame_times.push(start.elapsed().as_secs_f64() * 1000.0);

            loads += report.loaded as u64;
            unloads += report.unloaded as u64;
            failed += report.failed as u64;
        }

        let loaded_chunks = view.chunks().len() as u32;
        // Evict everything so modified chunks reach the store before counting.
        view.flush();
        let (saved, _) = view.storage().counts();
        let result = BenchmarkResult {
            scene_name: scene.name.to_string(),
            tick_count: self.tick_count,
            loads,
            unloads,
            failed,
            rebuilds: view.renderer().rebuilds,
            loaded_chunks,
            saved_chunks: saved,
            timings: compute_timings(&frame_times),
        };

        log::info!(
            "  {} loads, {} unloads, mean {:.3}ms, p95 {:.3}ms",
            result.loads,
            result.unloads,
            result.timings.mean_ms,
            result.timings.p95_ms
        );

        result
    }
}

impl BenchmarkResult {
    fn empty(scene_name: &str, tick_count: u32) -> Self {
        Self {
            scene_name: scene_name.to_string(),
            tick_count,
            loads: 0,
            unloads: 0,
            failed: 0,
            rebuilds: 0,
            loaded_chunks: 0,
            saved_chunks: 0,
            timings: compute_timings(&[]),
        }
    }
}

/// Walk a small ring around the observer so edits touch different voxels.
fn edit_offset(frame: u32) -> IVec3 {
    const RING: [IVec3; 4] = [
        IVec3::new(1, -1, 0),
        IVec3::new(0, -1, 1),
        IVec3::new(-1, -1, 0),
        IVec3::new(0, -1, -1),
    ];
    RING[frame as usize % RING.len()] * (1 + (frame / 4 % 3) as i32)
}

/// Mean and percentile statistics over per-frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
