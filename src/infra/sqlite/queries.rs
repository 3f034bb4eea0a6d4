use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::infra::sqlite::schema::open_connection;

pub fn load_preference(db_path: &Path, key: &str) -> Result<Option<String>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT value FROM preference WHERE key = ?1",
        [key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .with_context(|| format!("failed to load preference {key}"))
}

pub fn upsert_preference(db_path: &Path, key: &str, value: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "INSERT INTO preference(key, value, updated_at)
         VALUES (?1, ?2, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )
    .with_context(|| format!("failed to upsert preference {key}"))?;
    Ok(())
}

pub fn delete_preference(db_path: &Path, key: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute("DELETE FROM preference WHERE key = ?1", [key])
        .with_context(|| format!("failed to delete preference {key}"))?;
    Ok(())
}
