use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, warn};

use super::IndexCandidate;
use crate::platform;
use crate::storage::{ClassificationStore, IndexRecord};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PersistSummary {
    pub batches: usize,
    pub committed: usize,
    /// Hash was indexed by someone else between lookup and commit.
    pub ignored: usize,
    pub failed: usize,
}

/// Resolves directory/file-name ids for candidates and commits index batches.
pub struct BatchPersister<'a> {
    store: &'a dyn ClassificationStore,
    storage_root: &'a Path,
    location: &'a str,
    directories: HashMap<String, i64>,
    file_names: HashMap<String, i64>,
    summary: PersistSummary,
}

impl<'a> BatchPersister<'a> {
    pub fn new(store: &'a dyn ClassificationStore, storage_root: &'a Path, location: &'a str) -> Self {
        Self {
            store,
            storage_root,
            location,
            directories: HashMap::new(),
            file_names: HashMap::new(),
            summary: PersistSummary::default(),
        }
    }

    /// Wait for work, drain everything buffered into one batch, commit, repeat.
    /// Returns once every sender is gone and the buffer is empty.
    pub fn run(mut self, rx: Receiver<IndexCandidate>) -> PersistSummary {
        while let Ok(first) = rx.recv() {
            let mut batch = vec![first];
            batch.extend(rx.try_iter());
            self.commit_batch(&batch);
        }
        debug!("Persister finished: {:?}", self.summary);
        self.summary
    }

    pub fn commit_batch(&mut self, batch: &[IndexCandidate]) {
        let mut records = Vec::with_capacity(batch.len());
        for candidate in batch {
            match self.to_record(candidate) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Failed to resolve records for {}: {}", candidate.path.display(), e);
                    self.summary.failed += 1;
                }
            }
        }

        self.summary.batches += 1;
        if records.is_empty() {
            return;
        }

        match self.store.create_index_records(&records) {
            Ok(commit) => {
                self.summary.committed += commit.created;
                self.summary.ignored += commit.ignored;
                self.summary.failed += commit.failed;
            }
            Err(e) => {
                error!("Batch commit of {} index records failed: {}", records.len(), e);
                self.summary.failed += records.len();
            }
        }
    }

    fn to_record(&mut self, candidate: &IndexCandidate) -> Result<IndexRecord, crate::Error> {
        let relative = platform::relative_to_root(&candidate.path, self.storage_root);
        let directory = relative
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = relative
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .ok_or_else(|| {
                crate::Error::Persistence(format!("{} has no file name", candidate.path.display()))
            })?;

        let dir_id = match self.directories.get(&directory) {
            Some(id) => *id,
            None => {
                let id = self.store.upsert_directory_record(&directory)?;
                self.directories.insert(directory, id);
                id
            }
        };
        let file_id = match self.file_names.get(&file_name) {
            Some(id) => *id,
            None => {
                let id = self.store.upsert_file_name_record(&file_name)?;
                self.file_names.insert(file_name, id);
                id
            }
        };

        Ok(IndexRecord {
            dir_id,
            file_id,
            hash: candidate.hash.clone(),
            size: candidate.size,
            location: self.location.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use crossbeam_channel::unbounded;
    use std::path::PathBuf;

    fn candidate(root: &Path, rel: &str, hash: &str) -> IndexCandidate {
        IndexCandidate {
            hash: hash.to_string(),
            path: root.join(rel),
            size: 42,
        }
    }

    #[test]
    fn test_persister_drains_after_senders_drop() {
        let db = Database::open_in_memory().unwrap();
        db.add_location("ARCHIVE01").unwrap();
        let root = PathBuf::from("/srv/archive");
        let (tx, rx) = unbounded();
        for (i, hash) in ["H1", "H2", "H3"].iter().enumerate() {
            tx.send(candidate(&root, &format!("pics/{}.jpg", i), hash)).unwrap();
        }
        drop(tx);

        let summary = BatchPersister::new(&db, &root, "ARCHIVE01").run(rx);
        assert_eq!(summary.committed, 3);
        assert_eq!(summary.failed, 0);
        assert!(summary.batches >= 1);
        assert!(db.is_hashed("H2").unwrap());

        let mut files = db.location_file_list("ARCHIVE01").unwrap();
        files.sort();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("0.jpg"));
    }

    #[test]
    fn test_unknown_location_fails_records_not_batch() {
        let db = Database::open_in_memory().unwrap();
        let root = PathBuf::from("/srv/archive");
        let mut persister = BatchPersister::new(&db, &root, "NOPE");
        persister.commit_batch(&[candidate(&root, "a.jpg", "H1")]);
        assert_eq!(persister.summary.failed, 1);
        assert!(!db.is_hashed("H1").unwrap());
    }

    #[test]
    fn test_duplicate_hash_in_batch_is_ignored() {
        let db = Database::open_in_memory().unwrap();
        db.add_location("ARCHIVE01").unwrap();
        let root = PathBuf::from("/srv/archive");
        let mut persister = BatchPersister::new(&db, &root, "ARCHIVE01");
        persister.commit_batch(&[
            candidate(&root, "a.jpg", "SAME"),
            candidate(&root, "b.jpg", "SAME"),
        ]);
        assert_eq!(persister.summary.committed, 1);
        assert_eq!(persister.summary.ignored, 1);
    }
}
