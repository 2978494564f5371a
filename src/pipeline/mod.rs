//! Producer -> worker pool -> persister pipeline.
//!
//! One producer thread reads pending files into a bounded queue (the only
//! backpressure point), N workers hash and classify, and a single persister
//! batches new index records. An ETA tracker watches the pending list.

pub mod eta;
pub mod persister;
pub mod producer;
pub mod stats;
pub mod worker;

use crossbeam_channel::{bounded, unbounded};
use dashmap::DashSet;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::PipelineSettings;
use crate::progress::ProgressReporter;
use crate::storage::ClassificationStore;
use worker::WorkerContext;

pub use eta::{format_eta, EtaTracker, EtaWindow, UNKNOWN_ETA};
pub use persister::{BatchPersister, PersistSummary};
pub use stats::{RunStats, StatsSnapshot};
pub use worker::{classify, Checks, Classification, DnwDisposition};

/// How often blocked queue operations wake up to check the stop flag.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A file read into memory, waiting for a worker.
#[derive(Debug)]
pub struct FilePayload {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// A file whose hash is not in the index yet.
#[derive(Debug, Clone)]
pub struct IndexCandidate {
    pub hash: String,
    pub path: PathBuf,
    pub size: i64,
}

/// Paths found by the scanner and not yet claimed by the producer.
#[derive(Debug, Default)]
pub struct PendingPaths {
    paths: Mutex<VecDeque<PathBuf>>,
}

impl PendingPaths {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: Mutex::new(paths.into()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<PathBuf>> {
        self.paths.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn pop(&self) -> Option<PathBuf> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

pub(crate) struct Pipeline<'a> {
    pub store: &'a dyn ClassificationStore,
    pub settings: &'a PipelineSettings,
    pub checks: Checks,
    pub storage_root: &'a Path,
    pub location: &'a str,
    pub stats: &'a RunStats,
    pub flagged_dirs: &'a DashSet<PathBuf>,
    pub cancel: &'a AtomicBool,
}

impl Pipeline<'_> {
    /// Run every stage to completion (or cancellation) and return the persister's summary.
    pub fn run(&self, pending: &PendingPaths, reporter: &dyn ProgressReporter) -> PersistSummary {
        let (payload_tx, payload_rx) = bounded(self.settings.queue_capacity);
        let (candidate_tx, candidate_rx) = unbounded();
        let (eta_stop_tx, eta_stop_rx) = bounded::<()>(1);

        let ctx = WorkerContext {
            store: self.store,
            checks: self.checks,
            storage_root: self.storage_root,
            stats: self.stats,
            flagged_dirs: self.flagged_dirs,
            cancel: self.cancel,
        };

        info!("Starting {} workers", self.settings.workers);
        thread::scope(|s| {
            let persister = {
                let persister = BatchPersister::new(self.store, self.storage_root, self.location);
                thread::Builder::new()
                    .name("batch-persister".to_string())
                    .spawn_scoped(s, move || persister.run(candidate_rx))
            };

            let tracker = EtaTracker::new(self.settings.eta_window, self.settings.eta_interval);
            let eta = thread::Builder::new()
                .name("eta-tracker".to_string())
                .spawn_scoped(s, move || {
                    eta::run_eta_tracker(tracker, pending, self.stats, eta_stop_rx, reporter)
                });

            let producer = thread::Builder::new()
                .name("data-producer".to_string())
                .spawn_scoped(s, move || {
                    producer::run_producer(pending, payload_tx, self.cancel, self.stats)
                });

            let workers: Vec<_> = (0..self.settings.workers)
                .map(|id| {
                    let rx = payload_rx.clone();
                    let tx = candidate_tx.clone();
                    let ctx = &ctx;
                    thread::Builder::new()
                        .name(format!("hash-worker-{}", id))
                        .spawn_scoped(s, move || worker::run_worker(id, ctx, rx, tx))
                })
                .collect();
            drop(payload_rx);
            drop(candidate_tx);

            join_stage("producer", producer);

            info!("Waiting for worker threads to finish...");
            for (id, worker) in workers.into_iter().enumerate() {
                join_stage(&format!("worker {}", id), worker);
            }

            drop(eta_stop_tx);
            join_stage("ETA tracker", eta);

            let summary = join_stage("persister", persister).unwrap_or_default();
            debug!("Pipeline drained: {:?}", summary);
            summary
        })
    }
}

/// Join one pipeline thread, logging a failed spawn or a panic. Returns the
/// thread's result only when it ran to completion.
fn join_stage<T>(name: &str, spawned: io::Result<ScopedJoinHandle<'_, T>>) -> Option<T> {
    match spawned {
        Ok(handle) => match handle.join() {
            Ok(value) => Some(value),
            Err(_) => {
                error!("{} thread panicked", name);
                None
            }
        },
        Err(e) => {
            error!("Failed to spawn {}: {}", name, e);
            None
        }
    }
}
