use super::models::*;
use super::sqlite::Database;
use super::ClassificationStore;
use crate::error::Error;
use rusqlite::{params, Connection, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Split a root-relative path into (directory, file name). Root-level files get "".
fn split_relative(path: &str) -> (String, String) {
    let path = Path::new(path);
    let name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, name)
}

fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        Path::new(dir).join(name).to_string_lossy().into_owned()
    }
}

fn upsert_directory(conn: &Connection, path: &str) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO dirlist (dirpath) VALUES (?1)",
        params![path],
    )?;
    conn.query_row(
        "SELECT id FROM dirlist WHERE dirpath = ?1",
        params![path],
        |row| row.get(0),
    )
}

fn upsert_file_name(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO filelist (filename) VALUES (?1)",
        params![name],
    )?;
    conn.query_row(
        "SELECT id FROM filelist WHERE filename = ?1",
        params![name],
        |row| row.get(0),
    )
}

fn hash_exists(conn: &Connection, table: &str, hash: &str) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE hash = ?1)", table);
    conn.query_row(&sql, params![hash], |row| row.get(0))
}

impl ClassificationStore for Database {
    fn is_blacklisted(&self, hash: &str) -> Result<bool, Error> {
        Ok(hash_exists(&self.connection(), HashList::Blacklist.table(), hash)?)
    }

    fn is_dnw(&self, hash: &str) -> Result<bool, Error> {
        Ok(hash_exists(&self.connection(), HashList::Dnw.table(), hash)?)
    }

    fn is_hashed(&self, hash: &str) -> Result<bool, Error> {
        Ok(hash_exists(&self.connection(), "fileindex", hash)?)
    }

    fn is_valid_tag(&self, tag: &str) -> Result<bool, Error> {
        Ok(Database::location_id(&self.connection(), tag)?.is_some())
    }

    fn location_file_list(&self, tag: &str) -> Result<Vec<String>, Error> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT dl.dirpath, fl.filename FROM fileindex i \
             JOIN dirlist dl ON dl.id = i.dir \
             JOIN filelist fl ON fl.id = i.filename \
             JOIN location l ON l.id = i.location \
             WHERE l.tag = ?1",
        )?;
        let paths = stmt
            .query_map(params![tag], |row| {
                let dir: String = row.get(0)?;
                let name: String = row.get(1)?;
                Ok(join_relative(&dir, &name))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paths)
    }

    fn delete_index_entry(&self, path: &str) -> Result<usize, Error> {
        let (dir, name) = split_relative(path);
        let deleted = self.connection().execute(
            "DELETE FROM fileindex \
             WHERE dir = (SELECT id FROM dirlist WHERE dirpath = ?1) \
             AND filename = (SELECT id FROM filelist WHERE filename = ?2)",
            params![dir, name],
        )?;
        Ok(deleted)
    }

    fn delete_duplicate_entry(&self, path: &str) -> Result<usize, Error> {
        let (dir, name) = split_relative(path);
        let deleted = self.connection().execute(
            "DELETE FROM fileduplicate \
             WHERE dir = (SELECT id FROM dirlist WHERE dirpath = ?1) \
             AND filename = (SELECT id FROM filelist WHERE filename = ?2)",
            params![dir, name],
        )?;
        Ok(deleted)
    }

    fn upsert_directory_record(&self, path: &str) -> Result<i64, Error> {
        Ok(upsert_directory(&self.connection(), path)?)
    }

    fn upsert_file_name_record(&self, name: &str) -> Result<i64, Error> {
        Ok(upsert_file_name(&self.connection(), name)?)
    }

    fn create_index_records(&self, records: &[IndexRecord]) -> Result<BatchCommit, Error> {
        let mut conn = self.connection();
        let tx = conn.transaction()?;
        let mut commit = BatchCommit::default();
        let mut locations: HashMap<&str, Option<i64>> = HashMap::new();
        let added_at = chrono::Utc::now().to_rfc3339();

        for record in records {
            let location_id = match locations.get(record.location.as_str()) {
                Some(id) => *id,
                None => {
                    let id = Database::location_id(&tx, &record.location)?;
                    locations.insert(record.location.as_str(), id);
                    id
                }
            };
            let Some(location_id) = location_id else {
                warn!(
                    "Unknown location '{}' for hash {}, record dropped",
                    record.location, record.hash
                );
                commit.failed += 1;
                continue;
            };

            match tx.execute(
                "INSERT OR IGNORE INTO fileindex (hash, dir, filename, size, location, added_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.hash,
                    record.dir_id,
                    record.file_id,
                    record.size,
                    location_id,
                    added_at
                ],
            ) {
                Ok(0) => commit.ignored += 1,
                Ok(_) => commit.created += 1,
                Err(e) => {
                    warn!("Failed to create index entry for hash {}: {}", record.hash, e);
                    commit.failed += 1;
                }
            }
        }

        tx.commit()?;
        debug!(
            "Index batch committed: {} created, {} ignored, {} failed",
            commit.created, commit.ignored, commit.failed
        );
        Ok(commit)
    }

    fn add_to_list(&self, list: HashList, hash: &str) -> Result<bool, Error> {
        let sql = format!("INSERT OR IGNORE INTO {} (hash) VALUES (?1)", list.table());
        let inserted = self.connection().execute(&sql, params![hash])?;
        Ok(inserted > 0)
    }

    fn add_duplicate_record(&self, record: &DuplicateRecord, size: i64) -> Result<(), Error> {
        let conn = self.connection();
        let location_id = Database::location_id(&conn, &record.location)?.ok_or_else(|| {
            Error::InvalidInput(format!("unknown location tag '{}'", record.location))
        })?;
        let (dir, name) = split_relative(&record.path);
        let dir_id = upsert_directory(&conn, &dir)?;
        let file_id = upsert_file_name(&conn, &name)?;
        conn.execute(
            "INSERT OR IGNORE INTO fileduplicate (hash, dir, filename, size, location) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![record.hash, dir_id, file_id, size, location_id],
        )?;
        Ok(())
    }

    fn duplicate_records(&self) -> Result<Vec<DuplicateRecord>, Error> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT d.hash, dl.dirpath, fl.filename, l.tag FROM fileduplicate d \
             JOIN dirlist dl ON dl.id = d.dir \
             JOIN filelist fl ON fl.id = d.filename \
             JOIN location l ON l.id = d.location \
             UNION ALL \
             SELECT i.hash, dl.dirpath, fl.filename, l.tag FROM fileindex i \
             JOIN dirlist dl ON dl.id = i.dir \
             JOIN filelist fl ON fl.id = i.filename \
             JOIN location l ON l.id = i.location \
             WHERE i.hash IN (SELECT hash FROM fileduplicate) \
             ORDER BY 1",
        )?;
        let records = stmt
            .query_map([], |row| {
                let dir: String = row.get(1)?;
                let name: String = row.get(2)?;
                Ok(DuplicateRecord {
                    hash: row.get(0)?,
                    path: join_relative(&dir, &name),
                    location: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
