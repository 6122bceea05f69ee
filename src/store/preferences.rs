use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::{default_path, now, open_connection, open_memory_connection};
use crate::models::PhotoId;

/// Stores view preferences, currently the selected photo ids per view key.
///
/// Nothing here is called implicitly: the caller saves after a selection
/// change and restores before the next load.
pub struct PreferenceStore {
    conn: Mutex<Connection>,
}

impl PreferenceStore {
    pub fn open_default() -> Result<Self> {
        let db_path = default_path("preferences.sqlite")?;
        Self::open(&db_path)
    }

    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::from_connection(open_connection(path)?)?;
        info!("Opened preference store at {:?}", path);
        Ok(store)
    }

    /// Preferences that live only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(open_memory_connection()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS selections (
                view_key TEXT NOT NULL,
                photo_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (view_key, photo_id)
            );
            ",
        )
        .context("Failed to create preference tables")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Replaces the saved selection for `view_key`.
    pub fn save_selection(&self, view_key: &str, ids: &[PhotoId]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM selections WHERE view_key = ?1",
            params![view_key],
        )?;

        {
            let mut stmt = tx.prepare_cached(
                "
                INSERT OR IGNORE INTO selections (view_key, photo_id, position, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )?;
            let updated_at = now();
            for (position, id) in ids.iter().enumerate() {
                stmt.execute(params![view_key, id.0 as i64, position as i64, updated_at])?;
            }
        }

        tx.commit().context("Failed to save selection")?;
        debug!(view_key, count = ids.len(), "Saved selection");
        Ok(())
    }

    /// Saved selection for `view_key` in the order it was saved.
    pub fn load_selection(&self, view_key: &str) -> Result<Vec<PhotoId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT photo_id FROM selections WHERE view_key = ?1 ORDER BY position",
        )?;
        let ids = stmt
            .query_map(params![view_key], |row| row.get::<_, i64>(0))?
            .map(|id| id.map(|id| PhotoId(id as u64)))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load selection")?;
        Ok(ids)
    }

    pub fn clear_selection(&self, view_key: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM selections WHERE view_key = ?1",
            params![view_key],
        )?;
        Ok(())
    }
}
