use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use dashmap::DashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use super::stats::RunStats;
use super::{FilePayload, IndexCandidate, POLL_INTERVAL};
use crate::error::Error;
use crate::hasher;
use crate::platform::{self, DNW_DIR};
use crate::storage::ClassificationStore;

/// What to do with a file whose hash is on the DNW list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnwDisposition {
    Log,
    Delete,
    Move,
}

/// Which checks a worker runs, in priority order blacklist > DNW > index.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checks {
    pub blacklist: bool,
    pub dnw: Option<DnwDisposition>,
    pub index: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Blacklisted,
    Dnw(DnwDisposition),
    ToIndex,
    AlreadyIndexed,
    /// No enabled check applied.
    Ignored,
}

/// Evaluate the enabled checks for `hash`. The first match wins.
pub fn classify(
    store: &dyn ClassificationStore,
    checks: &Checks,
    hash: &str,
) -> Result<Classification, Error> {
    if checks.blacklist && store.is_blacklisted(hash)? {
        return Ok(Classification::Blacklisted);
    }
    if let Some(disposition) = checks.dnw {
        if store.is_dnw(hash)? {
            return Ok(Classification::Dnw(disposition));
        }
    }
    if checks.index {
        // Known hashes are not recorded again, not even as a duplicate.
        if store.is_hashed(hash)? {
            return Ok(Classification::AlreadyIndexed);
        }
        return Ok(Classification::ToIndex);
    }
    Ok(Classification::Ignored)
}

/// Shared, read-only state handed to every worker.
pub(crate) struct WorkerContext<'a> {
    pub store: &'a dyn ClassificationStore,
    pub checks: Checks,
    pub storage_root: &'a Path,
    pub stats: &'a RunStats,
    pub flagged_dirs: &'a DashSet<PathBuf>,
    pub cancel: &'a AtomicBool,
}

/// Worker loop: runs until cancelled, or until the queue is both empty and
/// disconnected (the producer has finished).
pub(crate) fn run_worker(
    id: usize,
    ctx: &WorkerContext<'_>,
    rx: Receiver<FilePayload>,
    persister: Sender<IndexCandidate>,
) {
    debug!(worker = id, "Worker starting");
    while !ctx.cancel.load(Ordering::Relaxed) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(payload) => process_payload(ctx, payload, &persister),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!(worker = id, "Worker finished");
}

fn process_payload(ctx: &WorkerContext<'_>, payload: FilePayload, persister: &Sender<IndexCandidate>) {
    let hash = hasher::hash_data(&payload.bytes);
    ctx.stats.record_hashed();

    let classification = match classify(ctx.store, &ctx.checks, &hash) {
        Ok(classification) => classification,
        Err(e) => {
            error!("Lookup failed for {}: {}", payload.path.display(), e);
            return;
        }
    };

    match classification {
        Classification::Blacklisted => {
            ctx.stats.record_blocked();
            if let Err(e) = platform::tag_blacklisted(&payload.path, &hash) {
                error!("Could not move file {} ({})", payload.path.display(), e);
            }
            if let Some(parent) = payload.path.parent() {
                warn!("Blacklisted file found in {}", parent.display());
                ctx.flagged_dirs.insert(parent.to_path_buf());
            }
        }
        Classification::Dnw(disposition) => {
            ctx.stats.record_dnw();
            apply_dnw(&payload.path, disposition, ctx.storage_root);
        }
        Classification::ToIndex => {
            let candidate = IndexCandidate {
                hash,
                size: payload.bytes.len() as i64,
                path: payload.path,
            };
            if let Err(e) = persister.send(candidate) {
                error!("Persister unavailable, dropping {}", e.0.path.display());
                return;
            }
            ctx.stats.record_queued_for_index();
        }
        Classification::AlreadyIndexed => {
            ctx.stats.record_already_indexed();
            info!("Hash {} for {} found in db, ignoring file", hash, payload.path.display());
        }
        Classification::Ignored => {}
    }
}

fn apply_dnw(path: &Path, disposition: DnwDisposition, storage_root: &Path) {
    match disposition {
        DnwDisposition::Log => info!("Found DNW {}", path.display()),
        DnwDisposition::Delete => match fs::remove_file(path) {
            Ok(()) => info!("Deleted DNW {}", path.display()),
            Err(e) => error!("Failed to delete DNW {}: {}", path.display(), e),
        },
        DnwDisposition::Move => match platform::move_with_structure(path, storage_root, DNW_DIR) {
            Ok(destination) => info!("Moved DNW {} to {}", path.display(), destination.display()),
            Err(e) => error!("Failed to move DNW {}: {}", path.display(), e),
        },
    }
}
