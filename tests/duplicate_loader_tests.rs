//! Runs alone in its own binary: it changes the process working directory.

use std::fs;
use tempfile::tempdir;

use archive_keeper::duplicates::{delete_selected, load_duplicates, TagMounts};
use archive_keeper::storage::{ClassificationStore, Database, DuplicateRecord};

#[test]
fn test_unmounted_entries_ignore_working_directory() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("pics")).unwrap();
    let local = tmp.path().join("pics").join("a.jpg");
    fs::write(&local, b"keep me").unwrap();
    std::env::set_current_dir(tmp.path()).unwrap();

    let db = Database::open_in_memory().unwrap();
    db.add_location("ONE").unwrap();
    db.add_location("TWO").unwrap();
    for location in ["ONE", "TWO"] {
        db.add_duplicate_record(
            &DuplicateRecord {
                hash: "AA".to_string(),
                path: "pics/a.jpg".to_string(),
                location: location.to_string(),
            },
            7,
        )
        .unwrap();
    }

    let mut groups = load_duplicates(&db, None, &TagMounts::new()).unwrap();
    assert_eq!(groups.len(), 1);
    let group = &mut groups[0];
    assert_eq!(group.len(), 2);
    assert!(group.entries().iter().all(|e| !e.is_valid()));
    assert!(group.entries().iter().all(|e| e.last_modified() == -1));

    for entry in group.entries_mut() {
        entry.set_selected(true);
    }
    assert_eq!(group.selected().count(), 0);

    let outcome = delete_selected(group);
    assert_eq!(outcome.deleted, 0);
    assert_eq!(outcome.failed, 0);
    assert_eq!(group.len(), 2);
    assert!(local.exists());
}
