use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::error::Error;
use crate::hasher;
use crate::storage::{ClassificationStore, HashList};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListOutcome {
    pub hashed: usize,
    /// Hashes that were not on the list before.
    pub added: usize,
    pub failed: usize,
    /// Files left unhashed because the run was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
}

enum FileResult {
    Hashed(String),
    Failed,
    Skipped,
}

/// Hash every file below `dir` and add the hashes to `list`.
pub fn hash_directory_into_list(
    store: &dyn ClassificationStore,
    dir: &Path,
    list: HashList,
    cancel: &AtomicBool,
) -> Result<ListOutcome, Error> {
    if !dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "{} is not an existing directory",
            dir.display()
        )));
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!("Could not read {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    info!("Adding {} files in {} to the {} list", files.len(), dir.display(), list.label());

    let results: Vec<FileResult> = files
        .par_iter()
        .map(|file| {
            if cancel.load(Ordering::Relaxed) {
                return FileResult::Skipped;
            }
            match hasher::hash_file(file) {
                Ok(hash) => FileResult::Hashed(hash),
                Err(e) => {
                    error!("Error processing file '{}': {}", file.display(), e);
                    FileResult::Failed
                }
            }
        })
        .collect();

    let mut outcome = ListOutcome::default();
    for result in results {
        match result {
            FileResult::Hashed(hash) => {
                outcome.hashed += 1;
                if store.add_to_list(list, &hash)? {
                    outcome.added += 1;
                }
            }
            FileResult::Failed => outcome.failed += 1,
            FileResult::Skipped => outcome.skipped += 1,
        }
    }
    outcome.cancelled = outcome.skipped > 0;

    if outcome.cancelled {
        warn!(
            "{} list: cancelled, {} files were not hashed",
            list.label(),
            outcome.skipped
        );
    }
    info!(
        "{} list: {} hashed, {} added, {} failed",
        list.label(),
        outcome.hashed,
        outcome.added,
        outcome.failed
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_hash_directory_into_dnw_list() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("a.jpg"), b"one").unwrap();
        fs::write(tmp.path().join("nested/b.png"), b"two").unwrap();
        fs::write(tmp.path().join("nested/c.png"), b"two").unwrap();

        let db = Database::open_in_memory().unwrap();
        let cancel = AtomicBool::new(false);
        let outcome = hash_directory_into_list(&db, tmp.path(), HashList::Dnw, &cancel).unwrap();

        assert_eq!(outcome.hashed, 3);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.skipped, 0);
        assert!(!outcome.cancelled);
        assert!(db.is_dnw(&hasher::hash_data(b"two")).unwrap());
        assert!(!db.is_blacklisted(&hasher::hash_data(b"two")).unwrap());
    }

    #[test]
    fn test_cancelled_run_reports_unhashed_files() {
        let tmp = tempdir().unwrap();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            fs::write(tmp.path().join(name), name).unwrap();
        }

        let db = Database::open_in_memory().unwrap();
        let cancel = AtomicBool::new(true);
        let outcome =
            hash_directory_into_list(&db, tmp.path(), HashList::Blacklist, &cancel).unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.hashed, 0);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.skipped, 3);
        assert!(!db.is_blacklisted(&hasher::hash_data(b"a.jpg")).unwrap());
    }

    #[test]
    fn test_missing_directory_is_invalid_input() {
        let db = Database::open_in_memory().unwrap();
        let result = hash_directory_into_list(
            &db,
            Path::new("/definitely/not/here"),
            HashList::Blacklist,
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
