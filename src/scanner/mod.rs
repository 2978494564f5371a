pub mod walk;

pub use walk::{is_accepted_media, scan_directory, ScanOptions, ScanOutcome};

use std::path::PathBuf;

/// Turn the store's relative path list into the sorted reference list the
/// scanner binary-searches. Sorting uses `Path` ordering, the same ordering the
/// lookup compares with.
pub fn sorted_reference_list(paths: Vec<String>) -> Vec<PathBuf> {
    let mut indexed: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
    indexed.sort();
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_reference_list_is_searchable() {
        let list = sorted_reference_list(vec![
            "b/z.jpg".to_string(),
            "a/y.jpg".to_string(),
            "a.jpg".to_string(),
            "a/b/x.jpg".to_string(),
        ]);
        for wanted in ["b/z.jpg", "a/y.jpg", "a.jpg", "a/b/x.jpg"] {
            assert!(list.binary_search(&PathBuf::from(wanted)).is_ok(), "{}", wanted);
        }
        assert!(list.binary_search(&PathBuf::from("c.jpg")).is_err());
    }
}
