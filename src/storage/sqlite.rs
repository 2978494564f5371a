use rusqlite::{params, Connection, OptionalExtension, Result};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.connection().execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA cache_size = -64000;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode, 64MB cache)");
        Ok(())
    }

    fn migrate_schema(&self) -> Result<()> {
        self.connection()
            .execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema initialized (version 1)");
        Ok(())
    }

    /// Exclusive access to the underlying connection. Writers are serialized here.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a location tag. Returns its id (existing or new).
    pub fn add_location(&self, tag: &str) -> Result<i64> {
        let conn = self.connection();
        conn.execute(
            "INSERT OR IGNORE INTO location (tag) VALUES (?1)",
            params![tag],
        )?;
        conn.query_row(
            "SELECT id FROM location WHERE tag = ?1",
            params![tag],
            |row| row.get(0),
        )
    }

    pub(crate) fn location_id(conn: &Connection, tag: &str) -> Result<Option<i64>> {
        conn.query_row(
            "SELECT id FROM location WHERE tag = ?1",
            params![tag],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn truncate_all(&self) -> Result<()> {
        self.connection().execute_batch(
            "DELETE FROM fileduplicate;
             DELETE FROM fileindex;
             DELETE FROM filelist;
             DELETE FROM dirlist;
             DELETE FROM dnw;
             DELETE FROM block;",
        )?;
        debug!("All tables truncated");
        Ok(())
    }
}
