pub mod access;
pub mod background;
pub mod chunk;
pub mod chunk_set;
pub mod renderer;
pub mod storage;
pub mod terrain;
mod test_harness;
pub mod window;

use std::collections::BTreeSet;

use chunk::Chunk;
use chunk_set::ActiveChunkSet;
use glam::Vec3;
use renderer::ChunkRenderer;
use storage::{LoadOutcome, StorageError, WorldStorage};
use tessera_core::config::ViewConfig;
use tessera_core::error::ConfigError;
use tessera_core::math::ChunkGrid;
use tessera_core::types::{BlockId, ChunkCoord, WorldCoord};
use window::ViewWindow;

pub use background::BackgroundStorage;
pub use renderer::NullRenderer;
pub use storage::GeneratorStorage;

/// Side effects of one `ChunkView::tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Observer's chunk for this tick.
    pub center: ChunkCoord,
    /// Chunks inserted into the active set.
    pub loaded: usize,
    /// Chunks evicted and handed back to storage.
    pub unloaded: usize,
    /// Load requests issued to storage.
    pub requested: usize,
    /// Loads that failed (immediately or on completion). Retried on a later tick.
    pub failed: usize,
    /// Pending loads cancelled because they left the window.
    pub cancelled: usize,
    /// Completed loads dropped because they were no longer wanted.
    pub discarded: usize,
}

impl TickReport {
    /// True when the tick changed nothing.
    pub fn is_quiet(&self) -> bool {
        self.loaded == 0
            && self.unloaded == 0
            && self.requested == 0
            && self.failed == 0
            && self.cancelled == 0
            && self.discarded == 0
    }
}

/// Keeps the chunks around a moving observer loaded and rendered.
///
/// Owns the active chunk set, the world storage and the renderer for its whole
/// lifetime. `tick` is the only operation that changes which chunks are loaded;
/// `render` and the block accessors work on whatever the last tick left behind.
///
/// ```ignore
/// let mut view = ChunkView::new(config, storage, renderer)?;
/// loop {
///     camera.update(dt);
///     view.tick(camera_to_world(camera.position(), UNITS_PER_VOXEL));
///     view.render();
/// }
/// ```
pub struct ChunkView<S: WorldStorage, R: ChunkRenderer> {
    config: ViewConfig,
    grid: ChunkGrid,
    chunks: ActiveChunkSet,
    /// Requested from storage but not delivered yet. Never readable.
    pending: BTreeSet<ChunkCoord>,
    center: Option<ChunkCoord>,
    /// Number of coordinates in a full window.
    window_len: usize,
    storage: S,
    renderer: R,
}

impl<S: WorldStorage, R: ChunkRenderer> ChunkView<S, R> {
    /// Create a view. Fails on a view distance below 1 or an invalid chunk size.
    pub fn new(config: ViewConfig, storage: S, renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid()?;
        let window_len =
            ViewWindow::new(ChunkCoord::ORIGIN, config.view_distance, config.shape)
                .coords()
                .len();

        log::info!(
            "Chunk view created: distance {} ({:?}), chunk size {}, {} chunks per window",
            config.view_distance,
            config.shape,
            grid.edge(),
            window_len
        );

        Ok(Self {
            config,
            grid,
            chunks: ActiveChunkSet::new(),
            pending: BTreeSet::new(),
            center: None,
            window_len,
            storage,
            renderer,
        })
    }

    /// Move the window to `observer` (world space, voxel units) and load or
    /// evict chunks to match.
    ///
    /// Never fails: chunks that storage cannot produce stay absent and are
    /// requested again on the next tick.
    pub fn tick(&mut self, observer: Vec3) -> TickReport {
        let center = self.grid.to_chunk_coord(observer);
        let window = ViewWindow::new(center, self.config.view_distance, self.config.shape);
        let mut report = TickReport {
            center,
            ..TickReport::default()
        };

        let failed_now = self.apply_completed_loads(&window, &mut report);

        let converged = self.center == Some(center)
            && self.chunks.len() + self.pending.len() == self.window_len;
        self.center = Some(center);
        if !converged {
            self.evict_outside(&window, &mut report);
            self.request_missing(&window, &failed_now, &mut report);
        }

        if !report.is_quiet() {
            log::debug!(
                "Tick at chunk {}: +{} -{} requested {} failed {} cancelled {} discarded {} ({} loaded, {} pending)",
                center,
                report.loaded,
                report.unloaded,
                report.requested,
                report.failed,
                report.cancelled,
                report.discarded,
                self.chunks.len(),
                self.pending.len()
            );
        }
        report
    }

    /// Synchronization point for asynchronous storage: insert finished loads
    /// that are still wanted, drop the rest.
    ///
    /// Returns the coordinates whose completed load failed. They are not
    /// requested again until the next tick.
    fn apply_completed_loads(
        &mut self,
        window: &ViewWindow,
        report: &mut TickReport,
    ) -> BTreeSet<ChunkCoord> {
        let mut failed = BTreeSet::new();
        for (coord, result) in self.storage.poll_ready() {
            if !self.pending.remove(&coord) || !window.contains(coord) {
                log::debug!("Discarding late load for chunk {}", coord);
                report.discarded += 1;
                continue;
            }
            match result.and_then(|chunk| self.check_delivery(coord, chunk)) {
                Ok(chunk) => self.insert_loaded(chunk, report),
                Err(e) => {
                    log::warn!("Chunk {} failed to load: {}", coord, e);
                    report.failed += 1;
                    failed.insert(coord);
                }
            }
        }
        failed
    }

    fn evict_outside(&mut self, window: &ViewWindow, report: &mut TickReport) {
        let leaving: Vec<ChunkCoord> = self
            .chunks
            .coords()
            .filter(|c| !window.contains(*c))
            .collect();
        for coord in leaving {
            if let Some(chunk) = self.chunks.remove(&coord) {
                self.release(coord, chunk);
                report.unloaded += 1;
            }
        }

        let stale: Vec<ChunkCoord> = self
            .pending
            .iter()
            .copied()
            .filter(|c| !window.contains(*c))
            .collect();
        for coord in stale {
            self.pending.remove(&coord);
            self.storage.cancel(coord);
            report.cancelled += 1;
        }
    }

    fn request_missing(
        &mut self,
        window: &ViewWindow,
        skip: &BTreeSet<ChunkCoord>,
        report: &mut TickReport,
    ) {
        let budget = self.config.max_loads_per_tick.unwrap_or(usize::MAX);
        for coord in window.coords() {
            if report.requested >= budget {
                break;
            }
            if self.chunks.contains(&coord)
                || self.pending.contains(&coord)
                || skip.contains(&coord)
            {
                continue;
            }
            report.requested += 1;

            let outcome = self
                .storage
                .load(coord, self.grid.edge())
                .and_then(|outcome| match outcome {
                    LoadOutcome::Ready(chunk) => {
                        self.check_delivery(coord, chunk).map(LoadOutcome::Ready)
                    }
                    LoadOutcome::Pending => Ok(LoadOutcome::Pending),
                });
            match outcome {
                Ok(LoadOutcome::Ready(chunk)) => self.insert_loaded(chunk, report),
                Ok(LoadOutcome::Pending) => {
                    self.pending.insert(coord);
                }
                Err(e) => {
                    log::warn!("Chunk {} failed to load: {}", coord, e);
                    report.failed += 1;
                }
            }
        }
    }

    /// Reject chunks delivered for the wrong coordinate or with the wrong edge.
    fn check_delivery(&self, coord: ChunkCoord, chunk: Chunk) -> Result<Chunk, StorageError> {
        let edge = self.grid.edge();
        if chunk.coord() != coord || chunk.edge() != edge {
            return Err(StorageError::Mismatch {
                expected: coord,
                expected_edge: edge,
                actual: chunk.coord(),
                actual_edge: chunk.edge(),
            });
        }
        Ok(chunk)
    }

    fn insert_loaded(&mut self, mut chunk: Chunk, report: &mut TickReport) {
        let coord = chunk.coord();
        chunk.mark_dirty();
        match self.chunks.insert(chunk) {
            Ok(()) => {
                if let Some(chunk) = self.chunks.get(&coord) {
                    self.renderer.on_chunk_loaded(coord, chunk);
                }
                report.loaded += 1;
            }
            Err(_) => log::warn!("Chunk {} delivered twice, keeping the loaded copy", coord),
        }
    }

    /// Notify the renderer, then move the chunk into storage.
    fn release(&mut self, coord: ChunkCoord, chunk: Chunk) {
        self.renderer.on_chunk_unloaded(coord);
        self.storage.unload(coord, chunk);
    }

    /// Rebuild geometry for dirty chunks, then draw everything.
    /// Returns the number of chunks rebuilt.
    pub fn render(&mut self) -> usize {
        let mut rebuilt = 0;
        for (coord, chunk) in self.chunks.iter_mut() {
            if chunk.take_dirty() {
                self.renderer.on_chunk_dirty(*coord, chunk);
                rebuilt += 1;
            }
        }
        self.renderer.draw_all(&self.chunks);
        rebuilt
    }

    /// Block at a continuous world position. Unloaded space reads as
    /// `BlockId::OUT_OF_BOUNDS`.
    pub fn block_at(&self, position: Vec3) -> BlockId {
        self.block(self.grid.to_voxel(position))
    }

    /// Block at a voxel position.
    pub fn block(&self, world: WorldCoord) -> BlockId {
        access::block_at(&self.chunks, &self.grid, world)
    }

    /// Set the block at a continuous world position. Writes into unloaded space
    /// are dropped and return false.
    pub fn set_block_at(&mut self, position: Vec3, block: BlockId) -> bool {
        self.set_block(self.grid.to_voxel(position), block)
    }

    /// Set the block at a voxel position.
    pub fn set_block(&mut self, world: WorldCoord, block: BlockId) -> bool {
        access::set_block_at(&mut self.chunks, &self.grid, world, block)
    }

    /// Hand every loaded chunk back to storage and cancel pending loads.
    /// Returns the number of chunks flushed. Called automatically on drop.
    pub fn flush(&mut self) -> usize {
        let drained = self.chunks.drain();
        let count = drained.len();
        for (coord, chunk) in drained {
            self.release(coord, chunk);
        }
        for coord in std::mem::take(&mut self.pending) {
            self.storage.cancel(coord);
        }
        self.center = None;
        count
    }

    pub fn chunks(&self) -> &ActiveChunkSet {
        &self.chunks
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Observer chunk from the last tick.
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, coord: &ChunkCoord) -> bool {
        self.pending.contains(coord)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<S: WorldStorage, R: ChunkRenderer> Drop for ChunkView<S, R> {
    fn drop(&mut self) {
        let flushed = self.flush();
        if flushed > 0 {
            log::info!("Chunk view dropped, flushed {} chunks to storage", flushed);
        }
    }
}
