//! Database connection and key/value operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::{Persistence, Result};

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode so a reader never blocks the single writer
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, updated_at],
            )?;
            Ok(())
        })?;

        tracing::debug!(key = %key, bytes = value.len(), "Stored value");

        Ok(())
    }

    pub fn remove_value(&self, key: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            Ok(())
        })?;

        tracing::debug!(key = %key, "Removed value");

        Ok(())
    }
}

impl Persistence for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_value(key)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let count: i32 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_set_get_remove() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("sessions").unwrap(), None);

        db.set("sessions", "[]").unwrap();
        assert_eq!(db.get("sessions").unwrap().as_deref(), Some("[]"));

        // Whole-value overwrite
        db.set("sessions", "[{\"name\":\"A\"}]").unwrap();
        assert_eq!(
            db.get("sessions").unwrap().as_deref(),
            Some("[{\"name\":\"A\"}]")
        );

        db.remove("sessions").unwrap();
        assert_eq!(db.get("sessions").unwrap(), None);

        // Removing again is fine
        db.remove("sessions").unwrap();
    }

    #[test]
    fn test_clones_share_connection() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();
        db.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_open_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabstash.db");

        {
            let db = Database::open(&path).unwrap();
            db.set("sessions", "[1]").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get("sessions").unwrap().as_deref(), Some("[1]"));
    }
}
