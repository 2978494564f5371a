use dashmap::DashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::PipelineSettings;
use crate::error::Error;
use crate::pipeline::{Checks, PendingPaths, PersistSummary, Pipeline, RunStats, StatsSnapshot};
use crate::platform::{self, BLACKLISTED_DIR};
use crate::progress::ProgressReporter;
use crate::scanner::{self, ScanOptions};
use crate::storage::ClassificationStore;

pub use crate::pipeline::DnwDisposition;

/// Which stages of a manage-files run are enabled.
#[derive(Debug, Clone, Default)]
pub struct ManageOptions {
    pub check_blacklist: bool,
    /// After the run, move every flagged directory under `<storage root>/CHECK`.
    pub move_only: bool,
    pub dnw: Option<DnwDisposition>,
    pub check_index: bool,
    pub skip_indexed: bool,
    pub prune_index: bool,
    /// Defaults to the filesystem root of the scanned directory.
    pub storage_root: Option<PathBuf>,
}

impl ManageOptions {
    fn checks(&self) -> Checks {
        Checks {
            blacklist: self.check_blacklist,
            dnw: self.dnw,
            index: self.check_index,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub stats: StatsSnapshot,
    pub persist: PersistSummary,
    /// Directories holding blacklisted content, sorted.
    pub flagged_dirs: Vec<PathBuf>,
    pub cancelled: bool,
    pub duration: Duration,
}

pub struct ManageFilesEngine {
    store: Arc<dyn ClassificationStore>,
    settings: PipelineSettings,
    cancel: Arc<AtomicBool>,
}

impl ManageFilesEngine {
    pub fn new(store: Arc<dyn ClassificationStore>, settings: PipelineSettings) -> Self {
        Self {
            store,
            settings,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared stop flag. Setting it has the same effect as [`cancel`](Self::cancel).
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Request a cooperative stop. In-flight renames, deletes and commits finish.
    pub fn cancel(&self) {
        info!("Cancel requested");
        self.cancel.store(true, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Run one manage-files pass over `root` for location `tag`:
    /// 1. Optional prune of index entries whose files are gone
    /// 2. Directory walk (with optional skip of indexed paths)
    /// 3. Producer/worker/persister pipeline
    /// 4. Optional move of flagged directories into CHECK
    pub fn start(
        &self,
        root: &Path,
        tag: &str,
        options: &ManageOptions,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport, Error> {
        if !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "{} is not an existing directory",
                root.display()
            )));
        }
        if !self.store.is_valid_tag(tag)? {
            return Err(Error::InvalidInput(format!("unknown location tag '{}'", tag)));
        }

        self.cancel.store(false, Ordering::Relaxed);
        let started = Instant::now();
        let storage_root = options
            .storage_root
            .clone()
            .unwrap_or_else(|| platform::storage_root_of(root));
        let stats = RunStats::default();
        info!(
            "Managing {} at location {} (storage root {})",
            root.display(),
            tag,
            storage_root.display()
        );

        if options.prune_index {
            prune_index(self.store.as_ref(), tag, &storage_root, &self.cancel, &stats, reporter)?;
        }

        let indexed = if options.skip_indexed && !self.is_cancelled() {
            let list = self.store.location_file_list(tag)?;
            debug!("Loaded {} indexed paths for {}", list.len(), tag);
            Some(scanner::sorted_reference_list(list))
        } else {
            None
        };

        reporter.on_scan_start();
        let scan_started = Instant::now();
        let outcome = scanner::scan_directory(
            root,
            &ScanOptions {
                storage_root: &storage_root,
                ignore_patterns: &self.settings.ignore_patterns,
                indexed: indexed.as_deref(),
            },
            &self.cancel,
            reporter,
        );
        stats.set_scan_totals(outcome.candidates.len(), outcome.skipped);
        reporter.on_scan_complete(
            outcome.candidates.len(),
            outcome.skipped,
            scan_started.elapsed().as_secs_f64(),
        );
        info!(
            "Found {} files to check, skipped {} indexed",
            outcome.candidates.len(),
            outcome.skipped
        );

        let flagged_dirs: DashSet<PathBuf> = outcome.flagged_dirs.into_iter().collect();
        let pending = PendingPaths::new(outcome.candidates);

        let hash_started = Instant::now();
        reporter.on_hash_start(pending.len());
        let persist = Pipeline {
            store: self.store.as_ref(),
            settings: &self.settings,
            checks: options.checks(),
            storage_root: &storage_root,
            location: tag,
            stats: &stats,
            flagged_dirs: &flagged_dirs,
            cancel: &self.cancel,
        }
        .run(&pending, reporter);
        reporter.on_hash_complete(&stats.snapshot(), hash_started.elapsed().as_secs_f64());

        let mut flagged_dirs: Vec<PathBuf> = flagged_dirs.into_iter().collect();
        flagged_dirs.sort();

        if options.move_only && !self.is_cancelled() {
            move_flagged_dirs(&flagged_dirs, &storage_root, &stats);
            reporter.on_move_complete(stats.snapshot().directories_moved);
        }

        let cancelled = self.is_cancelled();
        if cancelled {
            warn!("Run cancelled, {} files were not processed", pending.len());
        }

        Ok(RunReport {
            stats: stats.snapshot(),
            persist,
            flagged_dirs,
            cancelled,
            duration: started.elapsed(),
        })
    }
}

/// Remove index and duplicate records at `tag` whose file no longer exists
/// under `storage_root`. Returns the number of pruned paths.
pub fn prune_index(
    store: &dyn ClassificationStore,
    tag: &str,
    storage_root: &Path,
    cancel: &AtomicBool,
    stats: &RunStats,
    reporter: &dyn ProgressReporter,
) -> Result<usize, Error> {
    let started = Instant::now();
    let paths = store.location_file_list(tag)?;
    let total = paths.len();
    reporter.on_prune_start(total);
    info!("Checking {} indexed files at {}", total, tag);

    let mut pruned = 0;
    for (checked, relative) in paths.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            info!("Prune cancelled after {} of {} entries", checked, total);
            break;
        }
        if !storage_root.join(relative).exists() {
            let removed = store.delete_index_entry(relative)? + store.delete_duplicate_entry(relative)?;
            debug!("Pruned {} ({} records)", relative, removed);
            stats.record_pruned();
            pruned += 1;
        }
        reporter.on_prune_progress(checked + 1, total);
    }

    reporter.on_prune_complete(pruned, started.elapsed().as_secs_f64());
    info!("Pruned {} missing files from the index", pruned);
    Ok(pruned)
}

fn move_flagged_dirs(flagged_dirs: &[PathBuf], storage_root: &Path, stats: &RunStats) {
    for dir in flagged_dirs {
        match platform::move_with_structure(dir, storage_root, BLACKLISTED_DIR) {
            Ok(destination) => {
                info!("Moved {} to {}", dir.display(), destination.display());
                stats.record_directory_moved();
            }
            Err(e) => error!("Failed to move directory {}: {}", dir.display(), e),
        }
    }
}
