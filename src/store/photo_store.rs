use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row as SqlRow, Transaction};
use tokio::task;
use tracing::{debug, info};

use super::{default_path, open_connection, open_memory_connection};
use crate::error::FetchError;
use crate::models::{PhotoId, PhotoRecord};
use crate::source::PhotoSource;

const SELECT_PHOTO: &str = "SELECT id, width, height, saved_on, name, location FROM photos";

/// SQLite-backed photo catalog.
///
/// Cloning is cheap and shares the connection, which lets the store serve as
/// a [`PhotoSource`] from blocking tasks.
#[derive(Clone)]
pub struct PhotoStore {
    conn: Arc<Mutex<Connection>>,
}

impl PhotoStore {
    /// Opens or creates the catalog at `XDG_CONFIG_HOME/photogrid/catalog.sqlite`.
    pub fn open_default() -> Result<Self> {
        let db_path = default_path("catalog.sqlite")?;
        Self::open(&db_path)
    }

    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::from_connection(open_connection(path)?)?;
        info!("Opened photo catalog at {:?}", path);
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(open_memory_connection()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS photos (
                id INTEGER PRIMARY KEY NOT NULL,
                width INTEGER NOT NULL,
                height INTEGER NOT NULL,
                saved_on INTEGER NOT NULL,
                name TEXT,
                location TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_photos_saved_on ON photos(saved_on);
            ",
        )
        .context("Failed to create photo tables")?;

        debug!("Photo tables created/verified");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Inserts or updates a single photo.
    pub fn upsert_photo(&self, photo: &PhotoRecord) -> Result<()> {
        let conn = self.conn.lock();
        upsert(&conn, photo).context("Failed to upsert photo")?;
        Ok(())
    }

    /// Inserts or updates many photos in one transaction.
    pub fn upsert_photos(&self, photos: &[PhotoRecord]) -> Result<usize> {
        if photos.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let count = upsert_batch_in_tx(&tx, photos)?;
        tx.commit()?;

        debug!("Batch upserted {} photos", count);
        Ok(count)
    }

    pub fn get_photo(&self, id: PhotoId) -> Result<Option<PhotoRecord>> {
        let conn = self.conn.lock();
        let photo = conn
            .query_row(
                &format!("{SELECT_PHOTO} WHERE id = ?1"),
                params![id.0 as i64],
                photo_from_row,
            )
            .optional()
            .context("Failed to query photo")?;
        Ok(photo)
    }

    /// All photos, newest first.
    pub fn list(&self) -> Result<Vec<PhotoRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{SELECT_PHOTO} ORDER BY saved_on DESC, id"))?;
        let photos = stmt
            .query_map([], photo_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query photos")?;
        Ok(photos)
    }

    pub fn delete_photo(&self, id: PhotoId) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute("DELETE FROM photos WHERE id = ?1", params![id.0 as i64])?;
        Ok(rows > 0)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl PhotoSource for PhotoStore {
    async fn list_photos(&self) -> Result<Vec<PhotoRecord>, FetchError> {
        let store = self.clone();
        let photos = task::spawn_blocking(move || store.list())
            .await
            .map_err(|e| FetchError::TaskFailed(e.to_string()))??;
        Ok(photos)
    }
}

const UPSERT_PHOTO: &str = "
    INSERT INTO photos (id, width, height, saved_on, name, location)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(id) DO UPDATE SET
        width = excluded.width,
        height = excluded.height,
        saved_on = excluded.saved_on,
        name = excluded.name,
        location = excluded.location
";

fn upsert(conn: &Connection, photo: &PhotoRecord) -> rusqlite::Result<usize> {
    conn.execute(
        UPSERT_PHOTO,
        params![
            photo.id.0 as i64,
            photo.width,
            photo.height,
            photo.saved_on,
            photo.name,
            photo.location,
        ],
    )
}

fn upsert_batch_in_tx(tx: &Transaction, photos: &[PhotoRecord]) -> Result<usize> {
    let mut stmt = tx.prepare_cached(UPSERT_PHOTO)?;

    let mut count = 0;
    for photo in photos {
        stmt.execute(params![
            photo.id.0 as i64,
            photo.width,
            photo.height,
            photo.saved_on,
            photo.name,
            photo.location,
        ])?;
        count += 1;
    }

    Ok(count)
}

fn photo_from_row(row: &SqlRow<'_>) -> rusqlite::Result<PhotoRecord> {
    Ok(PhotoRecord {
        id: PhotoId(row.get::<_, i64>(0)? as u64),
        width: row.get(1)?,
        height: row.get(2)?,
        saved_on: row.get(3)?,
        selected: false,
        name: row.get(4)?,
        location: row.get(5)?,
    })
}
