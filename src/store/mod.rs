//! SQLite persistence for the photo catalog and view preferences.
//!
//! Both stores live in `XDG_CONFIG_HOME/photogrid/` by default and can also
//! be opened in memory for session-scoped use.

pub mod photo_store;
pub mod preferences;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::Connection;

pub use photo_store::PhotoStore;
pub use preferences::PreferenceStore;

/// Returns `XDG_CONFIG_HOME/photogrid/<file_name>`, creating the directory.
pub fn default_path(file_name: &str) -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("", "", "photogrid").context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;

    Ok(config_dir.join(file_name))
}

/// Opens a database file with the pragmas every store uses.
fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {:?}", path))?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA temp_store = MEMORY;
        PRAGMA foreign_keys = ON;
        ",
    )
    .context("Failed to configure SQLite pragmas")?;

    Ok(conn)
}

fn open_memory_connection() -> Result<Connection> {
    Connection::open_in_memory().context("Failed to open in-memory database")
}

/// Returns the current Unix timestamp.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
