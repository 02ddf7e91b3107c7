//! Full-state snapshots in SQLite. One row, replaced on every commit.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::state::StoreState;

pub fn load(conn: &Connection) -> Result<Option<StoreState>> {
    let data: Option<String> = conn
        .query_row("SELECT data FROM snapshots WHERE id = 1", [], |row| row.get(0))
        .optional()?;

    data.map(|json| serde_json::from_str(&json).context("Corrupt snapshot"))
        .transpose()
}

/// Replace the stored snapshot. The write is a single transaction, so a crash
/// mid-save leaves the previous snapshot intact.
pub fn save(conn: &mut Connection, state: &StoreState) -> Result<()> {
    let json = serde_json::to_string(state)?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO snapshots (id, data, saved_at) VALUES (1, ?1, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET data = excluded.data, saved_at = excluded.saved_at",
        [&json],
    )?;
    tx.commit()?;
    Ok(())
}
