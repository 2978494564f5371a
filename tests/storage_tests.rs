use archive_keeper::storage::{
    ClassificationStore, Database, DuplicateRecord, HashList, IndexRecord,
};
use archive_keeper::Error;

fn index_record(db: &Database, dir: &str, name: &str, hash: &str, location: &str) -> IndexRecord {
    IndexRecord {
        dir_id: db.upsert_directory_record(dir).unwrap(),
        file_id: db.upsert_file_name_record(name).unwrap(),
        hash: hash.to_string(),
        size: 1024,
        location: location.to_string(),
    }
}

#[test]
fn test_location_tags() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.is_valid_tag("ARCHIVE01").unwrap());

    let id = db.add_location("ARCHIVE01").unwrap();
    assert!(id > 0);
    assert_eq!(db.add_location("ARCHIVE01").unwrap(), id);
    assert!(db.is_valid_tag("ARCHIVE01").unwrap());
}

#[test]
fn test_upserts_return_stable_ids() {
    let db = Database::open_in_memory().unwrap();
    let a = db.upsert_directory_record("pics/2012").unwrap();
    let b = db.upsert_directory_record("pics/2013").unwrap();
    assert_ne!(a, b);
    assert_eq!(db.upsert_directory_record("pics/2012").unwrap(), a);

    let f = db.upsert_file_name_record("cat.jpg").unwrap();
    assert_eq!(db.upsert_file_name_record("cat.jpg").unwrap(), f);
}

#[test]
fn test_create_index_records_and_lookup() {
    let db = Database::open_in_memory().unwrap();
    db.add_location("ARCHIVE01").unwrap();

    let records = vec![
        index_record(&db, "pics", "a.jpg", "AAAA", "ARCHIVE01"),
        index_record(&db, "pics", "b.jpg", "BBBB", "ARCHIVE01"),
        index_record(&db, "", "root.png", "CCCC", "ARCHIVE01"),
    ];
    let commit = db.create_index_records(&records).unwrap();
    assert_eq!(commit.created, 3);
    assert_eq!(commit.ignored, 0);
    assert_eq!(commit.failed, 0);

    assert!(db.is_hashed("AAAA").unwrap());
    assert!(!db.is_hashed("DDDD").unwrap());

    let mut files = db.location_file_list("ARCHIVE01").unwrap();
    files.sort();
    assert_eq!(files, vec!["pics/a.jpg", "pics/b.jpg", "root.png"]);
    assert!(db.location_file_list("OTHER").unwrap().is_empty());
}

#[test]
fn test_one_bad_record_does_not_fail_batch() {
    let db = Database::open_in_memory().unwrap();
    db.add_location("ARCHIVE01").unwrap();

    let good = index_record(&db, "pics", "a.jpg", "AAAA", "ARCHIVE01");
    let dangling = IndexRecord {
        dir_id: 9999,
        ..index_record(&db, "pics", "b.jpg", "BBBB", "ARCHIVE01")
    };
    let unknown_location = index_record(&db, "pics", "c.jpg", "CCCC", "NOWHERE");

    let commit = db
        .create_index_records(&[good, dangling, unknown_location])
        .unwrap();
    assert_eq!(commit.created, 1);
    assert_eq!(commit.failed, 2);
    assert!(db.is_hashed("AAAA").unwrap());
    assert!(!db.is_hashed("BBBB").unwrap());
    assert!(!db.is_hashed("CCCC").unwrap());
}

#[test]
fn test_hash_lists_are_separate_and_idempotent() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.add_to_list(HashList::Dnw, "AAAA").unwrap());
    assert!(!db.add_to_list(HashList::Dnw, "AAAA").unwrap());
    assert!(db.add_to_list(HashList::Blacklist, "BBBB").unwrap());

    assert!(db.is_dnw("AAAA").unwrap());
    assert!(!db.is_blacklisted("AAAA").unwrap());
    assert!(db.is_blacklisted("BBBB").unwrap());
    assert!(!db.is_dnw("BBBB").unwrap());
}

#[test]
fn test_delete_entries_by_relative_path() {
    let db = Database::open_in_memory().unwrap();
    db.add_location("ARCHIVE01").unwrap();
    db.create_index_records(&[index_record(&db, "pics", "a.jpg", "AAAA", "ARCHIVE01")])
        .unwrap();
    db.add_duplicate_record(
        &DuplicateRecord {
            hash: "AAAA".to_string(),
            path: "pics/a.jpg".to_string(),
            location: "ARCHIVE01".to_string(),
        },
        1024,
    )
    .unwrap();

    assert_eq!(db.delete_index_entry("pics/missing.jpg").unwrap(), 0);
    assert_eq!(db.delete_index_entry("pics/a.jpg").unwrap(), 1);
    assert_eq!(db.delete_duplicate_entry("pics/a.jpg").unwrap(), 1);
    assert!(!db.is_hashed("AAAA").unwrap());
    assert!(db.duplicate_records().unwrap().is_empty());
}

#[test]
fn test_duplicate_records_include_indexed_original() {
    let db = Database::open_in_memory().unwrap();
    db.add_location("ONE").unwrap();
    db.add_location("TWO").unwrap();
    db.create_index_records(&[
        index_record(&db, "pics", "a.jpg", "AAAA", "ONE"),
        index_record(&db, "pics", "lonely.jpg", "ZZZZ", "ONE"),
    ])
    .unwrap();
    db.add_duplicate_record(
        &DuplicateRecord {
            hash: "AAAA".to_string(),
            path: "backup/a.jpg".to_string(),
            location: "TWO".to_string(),
        },
        1024,
    )
    .unwrap();

    let records = db.duplicate_records().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.hash == "AAAA"));
    assert!(records
        .iter()
        .any(|r| r.path == "pics/a.jpg" && r.location == "ONE"));
    assert!(records
        .iter()
        .any(|r| r.path == "backup/a.jpg" && r.location == "TWO"));
}

#[test]
fn test_duplicate_record_with_unknown_tag_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let result = db.add_duplicate_record(
        &DuplicateRecord {
            hash: "AAAA".to_string(),
            path: "a.jpg".to_string(),
            location: "NOWHERE".to_string(),
        },
        1,
    );
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_truncate_all_keeps_locations() {
    let db = Database::open_in_memory().unwrap();
    db.add_location("ARCHIVE01").unwrap();
    db.create_index_records(&[index_record(&db, "pics", "a.jpg", "AAAA", "ARCHIVE01")])
        .unwrap();
    db.add_to_list(HashList::Dnw, "DDDD").unwrap();

    db.truncate_all().unwrap();

    assert!(!db.is_hashed("AAAA").unwrap());
    assert!(!db.is_dnw("DDDD").unwrap());
    assert!(db.is_valid_tag("ARCHIVE01").unwrap());

    let dirs: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM dirlist", [], |row| row.get(0))
        .unwrap();
    assert_eq!(dirs, 0);
}
