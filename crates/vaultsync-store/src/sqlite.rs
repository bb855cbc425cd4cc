//! SQLite implementation of the store traits.
//!
//! This is the durable backend for a replica. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use vaultsync_core::{checked_path, FileRecord, Timestamp};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{ensure_fresh, FileStore, WatermarkStore};

const WATERMARK_KEY: &str = "last_synced_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All trait operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Local edit: create or overwrite a file at `at` without a staleness check.
    pub fn put(&self, path: &str, content: impl AsRef<[u8]>, at: Timestamp) -> Result<()> {
        let path = checked_path(path).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let content = content.as_ref();
        let conn = lock(&self.conn)?;

        conn.execute(
            "INSERT INTO files (path, content, size, created_at, updated_at, deleted_at, deleted)
             VALUES (?1, ?2, ?3, ?4, ?4, 0, 0)
             ON CONFLICT(path) DO UPDATE SET
                content = excluded.content,
                size = excluded.size,
                created_at = CASE WHEN files.deleted = 0 THEN files.created_at ELSE excluded.created_at END,
                updated_at = excluded.updated_at,
                deleted_at = 0,
                deleted = 0",
            params![path, content, content.len() as i64, at],
        )?;
        Ok(())
    }

    /// Local edit: delete a file at `at`, leaving a tombstone.
    ///
    /// Returns `false` if there was no live file to delete.
    pub fn delete(&self, path: &str, at: Timestamp) -> Result<bool> {
        let path = checked_path(path).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let conn = lock(&self.conn)?;
        let changed = conn.execute(TOMBSTONE_SQL, params![path, at])?;
        Ok(changed > 0)
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

const TOMBSTONE_SQL: &str = "UPDATE files
     SET content = NULL, size = 0, created_at = 0, updated_at = ?2, deleted_at = ?2, deleted = 1
     WHERE path = ?1 AND deleted = 0";

fn lock(conn: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let size: i64 = row.get("size")?;
    Ok(FileRecord {
        path: row.get("path")?,
        size: size.max(0) as u64,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
        deleted: row.get("deleted")?,
    })
}

/// `(updated_at, created_at, deleted)` for a path.
fn recorded_state(
    conn: &Connection,
    path: &str,
) -> Result<Option<(Timestamp, Timestamp, bool)>> {
    conn.query_row(
        "SELECT updated_at, created_at, deleted FROM files WHERE path = ?1",
        params![path],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .optional()
    .map_err(StoreError::from)
}

#[async_trait]
impl FileStore for SqliteStore {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                "SELECT path, size, created_at, updated_at, deleted_at, deleted
                 FROM files ORDER BY path",
            )?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    async fn get_file_content(&self, path: &str) -> Result<Bytes> {
        let path = path.to_string();

        self.blocking(move |conn| {
            let content: Option<Option<Vec<u8>>> = conn
                .query_row(
                    "SELECT content FROM files WHERE path = ?1 AND deleted = 0",
                    params![path],
                    |row| row.get(0),
                )
                .optional()?;

            match content {
                Some(Some(bytes)) => Ok(Bytes::from(bytes)),
                Some(None) => Ok(Bytes::new()),
                None => Err(StoreError::NotFound(path)),
            }
        })
        .await
    }

    async fn update(
        &self,
        path: &str,
        content: Bytes,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        let path = path.to_string();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let existing = recorded_state(&tx, &path)?;
            let recorded = existing.map(|(updated, _, _)| updated).unwrap_or(0);
            ensure_fresh(&path, recorded, previous_updated_at)?;

            let created_at = match existing {
                Some((_, created, false)) => created,
                _ => new_updated_at,
            };

            tx.execute(
                "INSERT INTO files (path, content, size, created_at, updated_at, deleted_at, deleted)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)
                 ON CONFLICT(path) DO UPDATE SET
                    content = excluded.content,
                    size = excluded.size,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at,
                    deleted_at = 0,
                    deleted = 0",
                params![
                    path,
                    &content[..],
                    content.len() as i64,
                    created_at,
                    new_updated_at
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn remove(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        now: Timestamp,
    ) -> Result<()> {
        let path = path.to_string();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let Some((recorded, _, _)) = recorded_state(&tx, &path)? else {
                return Ok(());
            };
            ensure_fresh(&path, recorded, previous_updated_at)?;

            tx.execute(TOMBSTONE_SQL, params![path, now])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn touch(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        let path = path.to_string();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            match recorded_state(&tx, &path)? {
                Some((recorded, _, false)) => {
                    ensure_fresh(&path, recorded, previous_updated_at)?;
                }
                _ => return Err(StoreError::NotFound(path)),
            }

            tx.execute(
                "UPDATE files SET updated_at = ?2 WHERE path = ?1",
                params![path, new_updated_at],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn prune(&self, path: &str) -> Result<()> {
        let path = path.to_string();

        self.blocking(move |conn| {
            conn.execute(
                "DELETE FROM files WHERE path = ?1 AND deleted = 1",
                params![path],
            )?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl WatermarkStore for SqliteStore {
    async fn load_watermark(&self) -> Result<Timestamp> {
        self.blocking(|conn| {
            let value: Option<Timestamp> = conn
                .query_row(
                    "SELECT value FROM sync_state WHERE key = ?1",
                    params![WATERMARK_KEY],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value.unwrap_or(0))
        })
        .await
    }

    async fn save_watermark(&self, at: Timestamp) -> Result<()> {
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO sync_state (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![WATERMARK_KEY, at],
            )?;
            Ok(())
        })
        .await
    }
}
