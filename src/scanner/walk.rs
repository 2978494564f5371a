use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::platform::{self, BLACKLISTED_DIR, DNW_DIR};
use crate::progress::ProgressReporter;

/// Directories under the storage root that are never descended into.
const IGNORED_DIRS: [&str; 4] = [
    BLACKLISTED_DIR,
    DNW_DIR,
    "$RECYCLE.BIN",
    "System Volume Information",
];

const MEDIA_EXTENSIONS: [&str; 3] = ["jpg", "png", "gif"];

pub struct ScanOptions<'a> {
    pub storage_root: &'a Path,
    pub ignore_patterns: &'a [String],
    /// Sorted root-relative paths already in the index. `Some` enables skipping.
    pub indexed: Option<&'a [PathBuf]>,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: Vec<PathBuf>,
    /// Directories holding at least one blacklist-tagged file, in discovery order.
    pub flagged_dirs: Vec<PathBuf>,
    pub skipped: usize,
    pub cancelled: bool,
}

/// Case-sensitive extension check on the text after the last dot.
pub fn is_accepted_media(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => MEDIA_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Walk `root` and collect hashing candidates. Unreadable entries are logged and
/// skipped. The cancel flag is checked before each directory is entered.
pub fn scan_directory(
    root: &Path,
    options: &ScanOptions<'_>,
    cancel: &AtomicBool,
    reporter: &dyn ProgressReporter,
) -> ScanOutcome {
    let ignored_paths: Vec<PathBuf> = IGNORED_DIRS
        .iter()
        .map(|dir| options.storage_root.join(dir))
        .collect();

    let ignore_patterns: Vec<Pattern> = options
        .ignore_patterns
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let mut outcome = ScanOutcome::default();
    let mut flagged: HashSet<PathBuf> = HashSet::new();
    let mut walker = WalkDir::new(root).follow_links(false).into_iter();

    loop {
        let entry = match walker.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(err)) => {
                error!("Could not read {}", err);
                continue;
            }
        };
        let path = entry.path();

        if entry.file_type().is_dir() {
            if cancel.load(Ordering::Relaxed) {
                info!("Directory walk cancelled at {}", path.display());
                outcome.cancelled = true;
                break;
            }
            if ignored_paths.iter().any(|ignored| ignored == path)
                || ignore_patterns.iter().any(|p| p.matches_path(path))
            {
                debug!("Skipping ignored directory {}", path.display());
                walker.skip_current_dir();
                continue;
            }
            reporter.on_scan_path(&path.to_string_lossy());
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if platform::is_blacklist_tagged(&file_name) {
            if let Some(parent) = path.parent() {
                if flagged.insert(parent.to_path_buf()) {
                    outcome.flagged_dirs.push(parent.to_path_buf());
                }
            }
            continue;
        }

        if !is_accepted_media(&file_name) {
            continue;
        }
        if ignore_patterns.iter().any(|p| p.matches_path(path)) {
            continue;
        }

        if let Some(indexed) = options.indexed {
            let relative = platform::relative_to_root(path, options.storage_root);
            if indexed.binary_search(&relative).is_ok() {
                outcome.skipped += 1;
                continue;
            }
        }

        outcome.candidates.push(path.to_path_buf());
    }

    outcome
}
