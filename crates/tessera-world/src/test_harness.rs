//! Scripted storage and recording renderer for chunk view tests.
//!
//! Both write into one shared event log so tests can check the relative order
//! of storage and renderer notifications.

#![cfg(test)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use tessera_core::types::{BlockId, ChunkCoord};

use crate::chunk::Chunk;
use crate::chunk_set::ActiveChunkSet;
use crate::renderer::ChunkRenderer;
use crate::storage::{ChunkGenerator, LoadOutcome, StorageError, WorldStorage};
use crate::terrain::FlatGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Load(ChunkCoord),
    Unload { coord: ChunkCoord, modified: bool },
    Cancel(ChunkCoord),
    Loaded(ChunkCoord),
    Unloaded(ChunkCoord),
    Rebuilt(ChunkCoord),
    Draw(Vec<ChunkCoord>),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &EventLog, pred: impl Fn(&Event) -> bool) -> usize {
    log.borrow().iter().filter(|e| pred(e)).count()
}

/// Storage backed by a flat generator whose behavior tests can script.
pub struct ScriptedStorage {
    log: EventLog,
    generator: FlatGenerator,
    /// Loads for these coordinates fail.
    pub failing: BTreeSet<ChunkCoord>,
    /// Answer `Pending` and hold requests until `complete_deferred`.
    pub defer: bool,
    /// Deliver chunks for the wrong coordinate.
    pub misdeliver: bool,
    /// Deliver chunks one voxel larger than requested.
    pub wrong_edge: bool,
    deferred: Vec<ChunkCoord>,
    ready: Vec<(ChunkCoord, Result<Chunk, StorageError>)>,
    /// Chunks received through `unload`, by coordinate.
    pub unloaded: BTreeMap<ChunkCoord, Chunk>,
}

impl ScriptedStorage {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            generator: FlatGenerator::new(-1, BlockId(1)),
            failing: BTreeSet::new(),
            defer: false,
            misdeliver: false,
            wrong_edge: false,
            deferred: Vec::new(),
            ready: Vec::new(),
            unloaded: BTreeMap::new(),
        }
    }

    fn produce(&self, coord: ChunkCoord, edge: i32) -> Result<Chunk, StorageError> {
        if self.failing.contains(&coord) {
            return Err(StorageError::Unavailable(format!("scripted failure at {coord}")));
        }
        let target = if self.misdeliver {
            ChunkCoord::new(coord.x + 100, coord.y, coord.z)
        } else {
            coord
        };
        let edge = if self.wrong_edge { edge + 1 } else { edge };
        self.generator.generate(target, edge)
    }

    /// Finish every deferred load, making the results visible to `poll_ready`.
    pub fn complete_deferred(&mut self, edge: i32) {
        for coord in std::mem::take(&mut self.deferred) {
            let result = self.produce(coord, edge);
            self.ready.push((coord, result));
        }
    }

    pub fn deferred(&self) -> &[ChunkCoord] {
        &self.deferred
    }
}

impl WorldStorage for ScriptedStorage {
    fn load(&mut self, coord: ChunkCoord, edge: i32) -> Result<LoadOutcome, StorageError> {
        self.log.borrow_mut().push(Event::Load(coord));
        if self.defer {
            self.deferred.push(coord);
            return Ok(LoadOutcome::Pending);
        }
        self.produce(coord, edge).map(LoadOutcome::Ready)
    }

    fn unload(&mut self, coord: ChunkCoord, chunk: Chunk) {
        self.log.borrow_mut().push(Event::Unload {
            coord,
            modified: chunk.is_modified(),
        });
        self.unloaded.insert(coord, chunk);
    }

    fn poll_ready(&mut self) -> Vec<(ChunkCoord, Result<Chunk, StorageError>)> {
        std::mem::take(&mut self.ready)
    }

    fn cancel(&mut self, coord: ChunkCoord) {
        self.log.borrow_mut().push(Event::Cancel(coord));
    }
}

/// Renderer that records every notification and keeps a geometry table keyed
/// by coordinate.
pub struct RecordingRenderer {
    log: EventLog,
    /// Coordinates with built geometry and the rebuild count for each.
    pub geometry: BTreeMap<ChunkCoord, u32>,
    pub frames: u32,
}

impl RecordingRenderer {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            geometry: BTreeMap::new(),
            frames: 0,
        }
    }
}

impl ChunkRenderer for RecordingRenderer {
    fn on_chunk_loaded(&mut self, coord: ChunkCoord, _chunk: &Chunk) {
        self.log.borrow_mut().push(Event::Loaded(coord));
    }

    fn on_chunk_unloaded(&mut self, coord: ChunkCoord) {
        self.geometry.remove(&coord);
        self.log.borrow_mut().push(Event::Unloaded(coord));
    }

    fn on_chunk_dirty(&mut self, coord: ChunkCoord, _chunk: &Chunk) {
        *self.geometry.entry(coord).or_insert(0) += 1;
        self.log.borrow_mut().push(Event::Rebuilt(coord));
    }

    fn draw_all(&mut self, chunks: &ActiveChunkSet) {
        self.frames += 1;
        // Anything not in the set has been unloaded
        let drawn: Vec<ChunkCoord> = self
            .geometry
            .keys()
            .copied()
            .filter(|c| chunks.contains(c))
            .collect();
        self.log.borrow_mut().push(Event::Draw(drawn));
    }
}
