use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub const SCHEMA_VERSION: i64 = 1;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("failed to read schema version")?;
    if version > SCHEMA_VERSION {
        anyhow::bail!(
            "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
        )
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS dataset (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            row_count   INTEGER NOT NULL,
            columns     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dataset_payload (
            dataset_id  TEXT PRIMARY KEY,
            rows        TEXT NOT NULL,
            FOREIGN KEY (dataset_id) REFERENCES dataset(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_dataset_created
            ON dataset(created_at, id);
        ",
    )
    .context("failed to initialize schema")?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
        .context("failed to record schema version")?;

    Ok(())
}
