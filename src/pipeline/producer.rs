use crossbeam_channel::{SendTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

use super::stats::RunStats;
use super::{FilePayload, PendingPaths, POLL_INTERVAL};
use crate::hasher;

/// Drain the pending list into the bounded queue. Blocks while the queue is
/// full; the wait is re-checked against `cancel` every poll interval.
/// Dropping `tx` on return tells the workers the producer is done.
pub(crate) fn run_producer(
    pending: &PendingPaths,
    tx: Sender<FilePayload>,
    cancel: &AtomicBool,
    stats: &RunStats,
) {
    while !cancel.load(Ordering::Relaxed) {
        let Some(path) = pending.pop() else {
            break;
        };

        let bytes = match hasher::read_full_file(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                stats.record_read_failure();
                continue;
            }
        };

        let mut payload = FilePayload { path, bytes };
        loop {
            match tx.send_timeout(payload, POLL_INTERVAL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(unsent)) => {
                    if cancel.load(Ordering::Relaxed) {
                        debug!("Producer cancelled while queue was full");
                        return;
                    }
                    payload = unsent;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    debug!("All workers gone, producer stopping");
                    return;
                }
            }
        }
    }
}
