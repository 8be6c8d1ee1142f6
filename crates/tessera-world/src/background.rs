use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tessera_core::types::ChunkCoord;

use crate::chunk::Chunk;
use crate::storage::{ChunkGenerator, LoadOutcome, StorageError, WorldStorage};

struct LoadJob {
    coord: ChunkCoord,
    edge: i32,
    cancel: Arc<AtomicBool>,
}

struct LoadDone {
    coord: ChunkCoord,
    cancel: Arc<AtomicBool>,
    result: Result<Chunk, StorageError>,
}

/// Storage that generates chunks on worker threads.
///
/// `load` queues a job and answers `Pending`; finished chunks come back through
/// `poll_ready`. Cancelled jobs are skipped by the workers if they have not
/// started, and their results are dropped if they have.
pub struct BackgroundStorage {
    jobs: Option<Sender<LoadJob>>,
    done: Receiver<LoadDone>,
    in_flight: HashMap<ChunkCoord, Arc<AtomicBool>>,
    workers: Vec<JoinHandle<()>>,
    discarded: u64,
}

impl BackgroundStorage {
    pub fn new<G: ChunkGenerator + 'static>(generator: G, worker_count: usize) -> Self {
        let generator = Arc::new(generator);
        let (tx_job, rx_job) = unbounded::<LoadJob>();
        let (tx_done, rx_done) = unbounded::<LoadDone>();

        let workers = (0..worker_count.max(1))
            .map(|i| {
                let generator = generator.clone();
                let rx_job = rx_job.clone();
                let tx_done = tx_done.clone();
                std::thread::Builder::new()
                    .name(format!("chunk-loader-{i}"))
                    .spawn(move || run_worker(generator.as_ref(), rx_job, tx_done))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("Failed to spawn chunk loader thread: {}", e);
                    None
                }
            })
            .collect();

        Self {
            jobs: Some(tx_job),
            done: rx_done,
            in_flight: HashMap::new(),
            workers,
            discarded: 0,
        }
    }

    /// One worker per available core.
    pub fn with_default_workers<G: ChunkGenerator + 'static>(generator: G) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        Self::new(generator, workers)
    }

    /// Number of requested chunks not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Chunks handed back through `unload`.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

fn run_worker(generator: &dyn ChunkGenerator, jobs: Receiver<LoadJob>, done: Sender<LoadDone>) {
    while let Ok(job) = jobs.recv() {
        if job.cancel.load(Ordering::Relaxed) {
            continue;
        }
        // A panicking generator fails the job, not the worker.
        let result = catch_unwind(AssertUnwindSafe(|| generator.generate(job.coord, job.edge)))
            .unwrap_or_else(|_| {
                Err(StorageError::Generation {
                    coord: job.coord,
                    reason: "generator panicked".to_string(),
                })
            });
        if job.cancel.load(Ordering::Relaxed) {
            continue;
        }
        let sent = done.send(LoadDone {
            coord: job.coord,
            cancel: job.cancel,
            result,
        });
        if sent.is_err() {
            break;
        }
    }
}

impl WorldStorage for BackgroundStorage {
    fn load(&mut self, coord: ChunkCoord, edge: i32) -> Result<LoadOutcome, StorageError> {
        if self.in_flight.contains_key(&coord) {
            return Ok(LoadOutcome::Pending);
        }
        if self.workers.is_empty() {
            return Err(StorageError::Disconnected);
        }
        let jobs = self.jobs.as_ref().ok_or(StorageError::Disconnected)?;

        let cancel = Arc::new(AtomicBool::new(false));
        jobs.send(LoadJob {
            coord,
            edge,
            cancel: cancel.clone(),
        })
        .map_err(|_| StorageError::Disconnected)?;
        self.in_flight.insert(coord, cancel);
        Ok(LoadOutcome::Pending)
    }

    fn unload(&mut self, _coord: ChunkCoord, _chunk: Chunk) {
        self.discarded += 1;
    }

    fn poll_ready(&mut self) -> Vec<(ChunkCoord, Result<Chunk, StorageError>)> {
        let mut ready = Vec::new();
        for done in self.done.try_iter() {
            // Only the latest request for a coordinate may complete it.
            let current = self
                .in_flight
                .get(&done.coord)
                .is_some_and(|flag| Arc::ptr_eq(flag, &done.cancel));
            if !current || done.cancel.load(Ordering::Relaxed) {
                continue;
            }
            self.in_flight.remove(&done.coord);
            ready.push((done.coord, done.result));
        }
        ready
    }

    fn cancel(&mut self, coord: ChunkCoord) {
        if let Some(flag) = self.in_flight.remove(&coord) {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

impl Drop for BackgroundStorage {
    fn drop(&mut self) {
        for flag in self.in_flight.values() {
            flag.store(true, Ordering::Relaxed);
        }
        // Closing the job channel lets workers fall out of their loop.
        self.jobs.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
