use rusqlite::{Connection, Result};

use rollcall_core::types::{ChatIdent, UserRecord};

/// Map a SELECT row (column order from `AUDIENCE_SQL`) to a UserRecord.
/// Centralised here so every query in this crate stays consistent.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get::<_, i64>(0)?.into(),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        username: row.get(3)?,
        salutation: row.get(4)?,
        private_chat: row.get::<_, Option<i64>>(5)?.map(ChatIdent),
    })
}

pub(crate) const AUDIENCE_SQL: &str = "SELECT u.id, u.first_name, u.last_name, u.username, u.salutation, u.private_chat
     FROM chat_members cm
     JOIN users u ON u.id = cm.user_id
     WHERE cm.chat_id = ?1
     ORDER BY cm.rowid";

/// Initialise all roster tables. Safe to call on every startup —
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_users_table(conn)?;
    create_chat_members_table(conn)?;
    Ok(())
}

fn create_users_table(conn: &Connection) -> Result<()> {
    // id is the platform's stable numeric user id, not a synthetic key.
    // salutation/private_chat are written only by their dedicated setters.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY NOT NULL,
            first_name    TEXT NOT NULL,
            last_name     TEXT,
            username      TEXT,
            salutation    TEXT,
            private_chat  INTEGER,
            first_seen_at TEXT NOT NULL,
            last_seen_at  TEXT NOT NULL
        );",
    )
}

fn create_chat_members_table(conn: &Connection) -> Result<()> {
    // UNIQUE(chat_id, user_id) keeps the roster deduplicated by identity;
    // rowid order is the deterministic audience order.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS chat_members (
            chat_id   INTEGER NOT NULL,
            user_id   INTEGER NOT NULL REFERENCES users(id),
            joined_at TEXT NOT NULL,
            UNIQUE(chat_id, user_id)
        );
        CREATE INDEX IF NOT EXISTS idx_chat_members_chat
            ON chat_members (chat_id);",
    )
}
