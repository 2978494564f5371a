use tracing::debug;

use super::group::DuplicateGroup;
use super::TagMounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    /// Only groups where every entry exists on disk.
    Valid,
    /// Only groups where every entry's location is mounted.
    Visible,
}

/// Drop whole groups that fail `mode`. Entries are never modified.
pub fn filter_groups(groups: &mut Vec<DuplicateGroup>, mode: FilterMode, mounts: &TagMounts) {
    let before = groups.len();
    match mode {
        FilterMode::All => return,
        FilterMode::Valid => groups.retain(|g| g.entries().iter().all(|e| e.is_valid())),
        FilterMode::Visible => {
            groups.retain(|g| g.entries().iter().all(|e| mounts.contains_key(e.location())))
        }
    }
    debug!("Filter {:?} kept {} of {} groups", mode, groups.len(), before);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::DuplicateEntry;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_filters() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("a.jpg");
        fs::write(&file, b"x").unwrap();

        let mut all_valid = DuplicateGroup::new();
        all_valid.add_entry(DuplicateEntry::new("AA", &file, "ARCHIVE01"));
        all_valid.add_entry(DuplicateEntry::new("AA", &file, "ARCHIVE01"));

        let mut partly_valid = DuplicateGroup::new();
        partly_valid.add_entry(DuplicateEntry::new("BB", &file, "ARCHIVE01"));
        partly_valid.add_entry(DuplicateEntry::new("BB", "missing.jpg", "ARCHIVE02"));

        let mut mounts = TagMounts::new();
        mounts.insert("ARCHIVE01".to_string(), PathBuf::from(tmp.path()));

        let groups = vec![all_valid, partly_valid];

        let mut kept = groups.clone();
        filter_groups(&mut kept, FilterMode::All, &mounts);
        assert_eq!(kept.len(), 2);

        let mut kept = groups.clone();
        filter_groups(&mut kept, FilterMode::Valid, &mounts);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].hash(), Some("AA"));

        let mut kept = groups;
        filter_groups(&mut kept, FilterMode::Visible, &mounts);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].hash(), Some("AA"));
    }
}
