use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            phone       TEXT NOT NULL,
            address     TEXT,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS complaints (
            id              TEXT PRIMARY KEY,
            user_id         TEXT REFERENCES users(id) ON DELETE CASCADE,
            title           TEXT NOT NULL,
            category        TEXT NOT NULL,
            location        TEXT NOT NULL,
            description     TEXT NOT NULL,
            evidence_files  TEXT,
            is_anonymous    INTEGER NOT NULL DEFAULT 0,
            tracking_code   TEXT UNIQUE,
            status          TEXT NOT NULL DEFAULT 'Pending',
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_complaints_user
            ON complaints(user_id, created_at);

        CREATE TABLE IF NOT EXISTS notifications (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            complaint_id    TEXT REFERENCES complaints(id) ON DELETE SET NULL,
            title           TEXT NOT NULL,
            message         TEXT NOT NULL,
            kind            TEXT NOT NULL DEFAULT 'info',
            is_read         INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
