use anyhow::Context;
use rusqlite::Connection;

/// Opens the database and creates the key-value table the store persists its
/// blobs into. The schema is a single `kv` table; there is no versioning or
/// migration scheme for the blob contents.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .context("failed to create kv table")?;

    Ok(conn)
}
