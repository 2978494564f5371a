pub mod models;
pub mod queries;
pub mod sqlite;

pub use models::{BatchCommit, DuplicateRecord, HashList, IndexRecord};
pub use sqlite::Database;

use crate::error::Error;

/// Key/record store answering classification lookups and holding the index.
///
/// Implementations serialize their own writes; the pipeline only batches them.
pub trait ClassificationStore: Send + Sync {
    fn is_blacklisted(&self, hash: &str) -> Result<bool, Error>;
    fn is_dnw(&self, hash: &str) -> Result<bool, Error>;
    fn is_hashed(&self, hash: &str) -> Result<bool, Error>;
    fn is_valid_tag(&self, tag: &str) -> Result<bool, Error>;

    /// Relative paths (storage root stripped) of every indexed file at `tag`.
    fn location_file_list(&self, tag: &str) -> Result<Vec<String>, Error>;

    fn delete_index_entry(&self, path: &str) -> Result<usize, Error>;
    fn delete_duplicate_entry(&self, path: &str) -> Result<usize, Error>;

    fn upsert_directory_record(&self, path: &str) -> Result<i64, Error>;
    fn upsert_file_name_record(&self, name: &str) -> Result<i64, Error>;

    /// Commit `records` as one batch. Individual failures are counted, not fatal.
    fn create_index_records(&self, records: &[IndexRecord]) -> Result<BatchCommit, Error>;

    /// Returns false if the hash was already on the list.
    fn add_to_list(&self, list: HashList, hash: &str) -> Result<bool, Error>;

    fn add_duplicate_record(&self, record: &DuplicateRecord, size: i64) -> Result<(), Error>;

    /// Every duplicate record plus the index record of each duplicated hash.
    fn duplicate_records(&self) -> Result<Vec<DuplicateRecord>, Error>;
}
