// SQLite persistence layer for client-local state (poll counts, vote flag).

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed key-value store. Each value is a JSON document stored as
/// text, so callers decide the shape of what they persist.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv_state (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Persist a JSON value under `key`, replacing any previous value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Persist several keys in one transaction so readers never observe a
    /// half-applied update.
    pub fn save_states(&self, entries: &[(&str, serde_json::Value)]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        for (key, value) in entries {
            let json_str =
                serde_json::to_string(value).context("failed to serialize state value")?;
            tx.execute(
                "INSERT OR REPLACE INTO kv_state (key, value) VALUES (?1, ?2)",
                params![key, json_str],
            )
            .with_context(|| format!("failed to save state `{key}`"))?;
        }
        tx.commit().context("failed to commit state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the key
    /// does not exist.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let json_str: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query state")?;

        match json_str {
            Some(s) => {
                let value = serde_json::from_str(&s)
                    .with_context(|| format!("failed to deserialize state `{key}`"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Delete the given keys. Missing keys are ignored.
    pub fn remove_states(&self, keys: &[&str]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        for key in keys {
            tx.execute("DELETE FROM kv_state WHERE key = ?1", params![key])
                .with_context(|| format!("failed to delete state `{key}`"))?;
        }
        tx.commit().context("failed to commit state removal")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    #[test]
    fn open_creates_kv_table() {
        let db = test_db();
        let conn = db.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert!(tables.contains(&"kv_state".to_string()));
    }

    #[test]
    fn save_and_load_state() {
        let db = test_db();
        let value = json!({"clayton": 3, "martin": 1});
        db.save_state("poll_counts", &value).unwrap();
        assert_eq!(db.load_state("poll_counts").unwrap(), Some(value));
    }

    #[test]
    fn load_state_returns_none_for_missing_key() {
        let db = test_db();
        assert!(db.load_state("nonexistent").unwrap().is_none());
    }

    #[test]
    fn save_state_overwrites_previous_value() {
        let db = test_db();
        db.save_state("key", &json!(1)).unwrap();
        db.save_state("key", &json!(2)).unwrap();
        assert_eq!(db.load_state("key").unwrap(), Some(json!(2)));
    }

    #[test]
    fn save_states_writes_all_keys() {
        let db = test_db();
        db.save_states(&[("a", json!(true)), ("b", json!({"x": 1}))])
            .unwrap();
        assert_eq!(db.load_state("a").unwrap(), Some(json!(true)));
        assert_eq!(db.load_state("b").unwrap(), Some(json!({"x": 1})));
    }

    #[test]
    fn remove_states_deletes_only_named_keys() {
        let db = test_db();
        db.save_state("a", &json!(1)).unwrap();
        db.save_state("b", &json!(2)).unwrap();
        db.remove_states(&["a", "missing"]).unwrap();
        assert!(db.load_state("a").unwrap().is_none());
        assert_eq!(db.load_state("b").unwrap(), Some(json!(2)));
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let db = test_db();
        db.conn()
            .execute(
                "INSERT INTO kv_state (key, value) VALUES ('bad', '{not json')",
                [],
            )
            .unwrap();
        assert!(db.load_state("bad").is_err());
    }

    #[test]
    fn open_creates_parent_directory() {
        let tmp = std::env::temp_dir().join("courtside_db_parent_test");
        let _ = std::fs::remove_dir_all(&tmp);
        let path = tmp.join("nested/state.db");
        let db = Database::open(&path).expect("should create parent dirs");
        db.save_state("k", &json!("v")).unwrap();
        assert!(path.exists());
        drop(db);
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
