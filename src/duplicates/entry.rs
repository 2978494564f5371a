use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};

/// One copy of duplicated content.
///
/// Validity and modification time are captured when the entry is built; an
/// invalid entry can never become selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry {
    hash: String,
    path: PathBuf,
    location: String,
    last_modified: i64,
    valid: bool,
    selected: bool,
}

impl DuplicateEntry {
    pub fn new(hash: impl Into<String>, path: impl Into<PathBuf>, location: impl Into<String>) -> Self {
        let path = path.into();
        let metadata = fs::metadata(&path).ok();
        let last_modified = metadata
            .as_ref()
            .map(|m| epoch_millis(FileTime::from_last_modification_time(m)))
            .unwrap_or(-1);

        Self {
            hash: hash.into(),
            path,
            location: location.into(),
            last_modified,
            valid: metadata.is_some(),
            selected: false,
        }
    }

    /// An entry whose location is not mounted here. Never stat'ed, never selectable.
    pub fn unresolved(
        hash: impl Into<String>,
        path: impl Into<PathBuf>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            path: path.into(),
            location: location.into(),
            last_modified: -1,
            valid: false,
            selected: false,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Epoch milliseconds, or -1 when the file could not be stat'ed.
    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        if self.valid {
            self.selected = selected;
        }
    }

    pub fn toggle(&mut self) {
        self.set_selected(!self.selected);
    }
}

/// Signed milliseconds since the epoch; times before 1970 come out negative.
fn epoch_millis(time: FileTime) -> i64 {
    time.unix_seconds() * 1000 + i64::from(time.nanoseconds() / 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn valid_entry() -> (TempDir, DuplicateEntry) {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("DuplicateEntryTestFile.txt");
        fs::write(&file, b"x").unwrap();
        filetime::set_file_mtime(&file, FileTime::from_unix_time(0, 100_000_000)).unwrap();
        (tmp, DuplicateEntry::new("12345", file, "ARCHIVE01"))
    }

    fn invalid_entry() -> DuplicateEntry {
        DuplicateEntry::new("12345", "not-valid", "ARCHIVE01")
    }

    #[test]
    fn test_valid_entry_selection() {
        let (_tmp, mut entry) = valid_entry();
        assert!(!entry.is_selected());
        entry.set_selected(true);
        assert!(entry.is_selected());
        entry.toggle();
        assert!(!entry.is_selected());
    }

    #[test]
    fn test_invalid_entry_never_selected() {
        let mut entry = invalid_entry();
        assert!(!entry.is_valid());
        entry.set_selected(true);
        assert!(!entry.is_selected());
        entry.toggle();
        assert!(!entry.is_selected());
    }

    #[test]
    fn test_timestamps() {
        let (_tmp, entry) = valid_entry();
        assert_eq!(entry.last_modified(), 100);
        assert_eq!(invalid_entry().last_modified(), -1);
    }

    #[test]
    fn test_pre_epoch_timestamp_stays_valid() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("old.jpg");
        fs::write(&file, b"x").unwrap();
        filetime::set_file_mtime(&file, FileTime::from_unix_time(-5, 500_000_000)).unwrap();

        let entry = DuplicateEntry::new("12345", &file, "ARCHIVE01");
        assert!(entry.is_valid());
        assert_eq!(entry.last_modified(), -4500);
    }

    #[test]
    fn test_unresolved_entry_skips_filesystem() {
        let (_tmp, valid) = valid_entry();
        let mut entry = DuplicateEntry::unresolved("12345", valid.path(), "ARCHIVE02");
        assert!(!entry.is_valid());
        assert_eq!(entry.last_modified(), -1);
        entry.set_selected(true);
        assert!(!entry.is_selected());
    }
}
