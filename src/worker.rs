use std::{
    num::NonZeroUsize,
    path::{self, Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc::{self, SendError, Sender},
    },
    thread,
    time::Instant,
};

use crate::{
    message::FromWorker,
    thumbnail::{ThumbnailCache, WarmError},
};

pub struct WarmOptions {
    pub jobs: usize,
    pub size: u32,
    /// No new items are started once this passes.
    pub deadline: Option<Instant>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl WarmReport {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Completed/total for the warming phase. Only the collecting thread owns it.
#[derive(Debug)]
pub struct ProgressCounter {
    completed: usize,
    total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        ProgressCounter {
            completed: 0,
            total,
        }
    }

    pub fn advance(&mut self) -> usize {
        debug_assert!(self.completed < self.total, "progress past total");
        self.completed = (self.completed + 1).min(self.total);
        self.completed
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Handed to the progress callback once per finished item.
pub struct Tick<'a> {
    pub completed: usize,
    pub path: &'a Path,
    pub outcome: &'a Result<(), WarmError>,
}

/// Number of workers to run: the request (or every core) clamped to the
/// hardware and to the amount of work.
pub fn worker_count(requested: Option<usize>, items: usize) -> usize {
    let available = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);

    requested
        .unwrap_or(available)
        .clamp(1, available)
        .min(items.max(1))
}

struct Worker<'a> {
    id: usize,
    queue: &'a [PathBuf],
    cursor: &'a AtomicUsize,
    cache: &'a dyn ThumbnailCache,
    size: u32,
    deadline: Option<Instant>,
    tx: Sender<FromWorker>,
}

impl Worker<'_> {
    fn run(&self) -> Result<(), SendError<FromWorker>> {
        self.tx.send(FromWorker::Started(self.id))?;

        loop {
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }

            let index = self.cursor.fetch_add(1, Ordering::Relaxed);
            let Some(path) = self.queue.get(index) else {
                break;
            };

            let outcome = warm_one(self.cache, path, self.size);
            self.tx.send(FromWorker::Processed(path.clone(), outcome))?;
        }

        self.tx.send(FromWorker::Stopped(self.id))
    }
}

fn warm_one(cache: &dyn ThumbnailCache, path: &Path, size: u32) -> Result<(), WarmError> {
    let absolute = path::absolute(path)?;
    cache.warm(&absolute, size)
}

/// Warms every path in `queue` on a pool of `options.jobs` threads.
///
/// Each path is handed to exactly one worker. `on_tick` runs on the calling
/// thread after every attempt, successful or not, so it needs no locking.
pub fn warm_all<F>(
    queue: &[PathBuf],
    cache: &dyn ThumbnailCache,
    options: &WarmOptions,
    mut on_tick: F,
) -> WarmReport
where
    F: FnMut(Tick),
{
    let mut counter = ProgressCounter::new(queue.len());
    let mut report = WarmReport {
        total: queue.len(),
        ..Default::default()
    };
    let cursor = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<FromWorker>();

    thread::scope(|scope| {
        for id in 0..options.jobs.max(1) {
            let worker = Worker {
                id,
                queue,
                cursor: &cursor,
                cache,
                size: options.size,
                deadline: options.deadline,
                tx: tx.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("warm-{}", id))
                .spawn_scoped(scope, move || {
                    if let Err(e) = worker.run() {
                        log::error!("worker {} lost its channel: {}", worker.id, e);
                    }
                });
            if let Err(e) = spawned {
                log::error!("could not start worker {}: {}", id, e);
            }
        }
        drop(tx);

        for recieved in rx {
            match recieved {
                FromWorker::Started(id) => log::debug!("worker {} started", id),
                FromWorker::Stopped(id) => log::debug!("worker {} stopped", id),
                FromWorker::Processed(path, outcome) => {
                    match outcome.is_ok() {
                        true => report.succeeded += 1,
                        false => report.failed += 1,
                    }
                    let completed = counter.advance();
                    on_tick(Tick {
                        completed,
                        path: &path,
                        outcome: &outcome,
                    });
                }
            }
        }
    });

    report.skipped = counter.total() - counter.completed();
    report
}
