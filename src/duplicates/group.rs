use std::path::Path;
use tracing::warn;

use super::entry::DuplicateEntry;

/// Entries sharing one hash. Selection is a flag on each entry, so every entry
/// is in exactly one of `selected()` / `not_selected()`.
#[derive(Debug, Clone, Default)]
pub struct DuplicateGroup {
    entries: Vec<DuplicateEntry>,
}

impl DuplicateGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry`. An entry whose hash differs from the group's is
    /// rejected and false is returned.
    pub fn add_entry(&mut self, entry: DuplicateEntry) -> bool {
        if let Some(hash) = self.hash() {
            if hash != entry.hash() {
                warn!(
                    "Rejected {} with hash {} from group {}",
                    entry.path().display(),
                    entry.hash(),
                    hash
                );
                return false;
            }
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[DuplicateEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [DuplicateEntry] {
        &mut self.entries
    }

    pub fn selected(&self) -> impl Iterator<Item = &DuplicateEntry> {
        self.entries.iter().filter(|e| e.is_selected())
    }

    pub fn not_selected(&self) -> impl Iterator<Item = &DuplicateEntry> {
        self.entries.iter().filter(|e| !e.is_selected())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flip the selection of the entry at `path`. Returns false if no entry matches.
    pub fn toggle(&mut self, path: &Path) -> bool {
        match self.entries.iter_mut().find(|e| e.path() == path) {
            Some(entry) => {
                entry.toggle();
                true
            }
            None => false,
        }
    }

    pub fn set_selected(&mut self, path: &Path, selected: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.path() == path) {
            Some(entry) => {
                entry.set_selected(selected);
                true
            }
            None => false,
        }
    }

    pub fn remove_entry(&mut self, path: &Path) -> Option<DuplicateEntry> {
        let index = self.entries.iter().position(|e| e.path() == path)?;
        Some(self.entries.remove(index))
    }

    /// First entry, used as the group's preview.
    pub fn representative(&self) -> Option<&DuplicateEntry> {
        self.entries.first()
    }

    /// Oldest first. Unreadable entries (-1) sort to the front.
    pub fn sort_by_date(&mut self) {
        self.entries.sort_by_key(|e| e.last_modified());
    }

    pub fn hash(&self) -> Option<&str> {
        self.representative().map(|e| e.hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_partitions_cover_group() {
        let tmp = tempdir().unwrap();
        let mut group = DuplicateGroup::new();
        for i in 0..4 {
            let file = tmp.path().join(format!("{}.jpg", i));
            fs::write(&file, b"x").unwrap();
            group.add_entry(DuplicateEntry::new("AA", file, "ARCHIVE01"));
        }
        group.add_entry(DuplicateEntry::new("AA", tmp.path().join("gone.jpg"), "ARCHIVE01"));

        assert!(group.toggle(&tmp.path().join("1.jpg")));
        assert!(group.set_selected(&tmp.path().join("2.jpg"), true));
        assert!(group.set_selected(&tmp.path().join("gone.jpg"), true));
        assert!(!group.toggle(&tmp.path().join("missing.jpg")));

        assert_eq!(group.selected().count(), 2);
        assert_eq!(group.not_selected().count(), 3);
        assert_eq!(group.len(), group.selected().count() + group.not_selected().count());
    }

    #[test]
    fn test_remove_until_empty() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("a.jpg");
        fs::write(&file, b"x").unwrap();
        let mut group = DuplicateGroup::new();
        group.add_entry(DuplicateEntry::new("AA", &file, "ARCHIVE01"));

        assert!(group.remove_entry(&file).is_some());
        assert!(group.is_empty());
        assert!(group.representative().is_none());
        assert!(group.remove_entry(&file).is_none());
    }

    #[test]
    fn test_mismatched_hash_is_rejected() {
        let tmp = tempdir().unwrap();
        let first = tmp.path().join("a.jpg");
        let other = tmp.path().join("b.jpg");
        fs::write(&first, b"x").unwrap();
        fs::write(&other, b"y").unwrap();

        let mut group = DuplicateGroup::new();
        assert!(group.add_entry(DuplicateEntry::new("AA", &first, "ARCHIVE01")));
        assert!(!group.add_entry(DuplicateEntry::new("BB", &other, "ARCHIVE01")));
        assert_eq!(group.len(), 1);
        assert_eq!(group.hash(), Some("AA"));
        assert!(group.add_entry(DuplicateEntry::new("AA", &other, "ARCHIVE02")));
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_sort_by_date() {
        let tmp = tempdir().unwrap();
        let mut group = DuplicateGroup::new();
        for (name, secs) in [("new.jpg", 3000), ("old.jpg", 1000), ("mid.jpg", 2000)] {
            let file = tmp.path().join(name);
            fs::write(&file, b"x").unwrap();
            filetime::set_file_mtime(&file, FileTime::from_unix_time(secs, 0)).unwrap();
            group.add_entry(DuplicateEntry::new("AA", file, "ARCHIVE01"));
        }
        group.add_entry(DuplicateEntry::new("AA", tmp.path().join("gone.jpg"), "ARCHIVE01"));

        group.sort_by_date();
        let names: Vec<_> = group
            .entries()
            .iter()
            .map(|e| e.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["gone.jpg", "old.jpg", "mid.jpg", "new.jpg"]);
    }
}
