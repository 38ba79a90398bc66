use rusqlite::{Connection, Result};

/// Initialise the configs table. Safe to call on every startup —
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS configs (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_email    TEXT NOT NULL,
            name           TEXT NOT NULL DEFAULT 'Default Config',
            token          TEXT NOT NULL,
            message        TEXT NOT NULL,
            channel_ids    TEXT NOT NULL,  -- comma-separated
            delay_seconds  INTEGER NOT NULL DEFAULT 60,
            image_urls     TEXT NOT NULL DEFAULT '',  -- comma-separated
            created_at     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_configs_owner
            ON configs (owner_email);",
    )
}
