use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by every pipeline thread.
#[derive(Debug, Default)]
pub struct RunStats {
    hashed: AtomicUsize,
    blocked: AtomicUsize,
    to_index: AtomicUsize,
    skipped: AtomicUsize,
    directories_moved: AtomicUsize,
    dnw: AtomicUsize,
    queued_for_index: AtomicUsize,
    already_indexed: AtomicUsize,
    read_failures: AtomicUsize,
    pruned: AtomicUsize,
}

impl RunStats {
    pub fn record_hashed(&self) {
        self.hashed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blocked(&self) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dnw(&self) {
        self.dnw.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queued_for_index(&self) {
        self.queued_for_index.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_already_indexed(&self) {
        self.already_indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_directory_moved(&self) {
        self.directories_moved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pruned(&self) {
        self.pruned.fetch_add(1, Ordering::Relaxed);
    }

    /// Scanner totals are known only once the walk finishes.
    pub fn set_scan_totals(&self, to_index: usize, skipped: usize) {
        self.to_index.store(to_index, Ordering::Relaxed);
        self.skipped.store(skipped, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hashed: self.hashed.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            to_index: self.to_index.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            directories_moved: self.directories_moved.load(Ordering::Relaxed),
            dnw: self.dnw.load(Ordering::Relaxed),
            queued_for_index: self.queued_for_index.load(Ordering::Relaxed),
            already_indexed: self.already_indexed.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hashed: usize,
    pub blocked: usize,
    /// Candidates found by the directory walk.
    pub to_index: usize,
    /// Candidates skipped because their path is already indexed.
    pub skipped: usize,
    pub directories_moved: usize,
    pub dnw: usize,
    /// New hashes handed to the persister.
    pub queued_for_index: usize,
    pub already_indexed: usize,
    pub read_failures: usize,
    pub pruned: usize,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    run_at: String,
    location: &'a str,
    cancelled: bool,
    duration_secs: f64,
    hashed: usize,
    blocked: usize,
    to_index: usize,
    skipped: usize,
    directories_moved: usize,
    dnw: usize,
    queued_for_index: usize,
    already_indexed: usize,
    read_failures: usize,
    pruned: usize,
}

impl StatsSnapshot {
    /// Append this run to a CSV file, writing the header when the file is new.
    pub fn write_csv(
        &self,
        filename: &str,
        location: &str,
        cancelled: bool,
        duration_secs: f64,
    ) -> Result<(), csv::Error> {
        let file_exists = fs::metadata(filename).is_ok();
        let file = OpenOptions::new().append(true).create(true).open(filename)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);

        wtr.serialize(CsvRow {
            run_at: chrono::Local::now().to_rfc3339(),
            location,
            cancelled,
            duration_secs,
            hashed: self.hashed,
            blocked: self.blocked,
            to_index: self.to_index,
            skipped: self.skipped,
            directories_moved: self.directories_moved,
            dnw: self.dnw,
            queued_for_index: self.queued_for_index,
            already_indexed: self.already_indexed,
            read_failures: self.read_failures,
            pruned: self.pruned,
        })?;
        wtr.flush()?;
        Ok(())
    }
}
