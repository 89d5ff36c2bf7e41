use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use rollcall_core::types::{ChatIdent, UserIdent, UserRecord};

use crate::db::{init_db, row_to_user, AUDIENCE_SQL};
use crate::error::{Result, RosterError};
use crate::store::RosterStore;

/// SQLite-backed roster. The default durable backend.
///
/// Wraps the connection in a Mutex; SQLite serialises writers anyway, and
/// the engine's per-chat guards keep the read-check-remove sequence of a
/// single chat's resolution atomic.
pub struct SqliteRoster {
    conn: Mutex<Connection>,
}

impl SqliteRoster {
    /// Takes an opened connection and runs the idempotent migrations.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::new(conn)
    }
}

impl RosterStore for SqliteRoster {
    fn upsert(&self, chat: ChatIdent, user: &UserRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();

        // Refresh display fields only — never clobber salutation or
        // private_chat, which arrive through their own setters.
        conn.execute(
            "INSERT INTO users (id, first_name, last_name, username, first_seen_at, last_seen_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(id) DO UPDATE SET
                first_name   = excluded.first_name,
                last_name    = excluded.last_name,
                username     = excluded.username,
                last_seen_at = excluded.last_seen_at",
            rusqlite::params![
                user.id.as_i64(),
                user.first_name,
                user.last_name,
                user.username,
                now
            ],
        )?;

        let added = conn.execute(
            "INSERT OR IGNORE INTO chat_members (chat_id, user_id, joined_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![chat.as_i64(), user.id.as_i64(), now],
        )?;
        if added > 0 {
            debug!(chat = %chat, user = %user.id, "roster: new member observed");
        }
        Ok(())
    }

    fn audience_of(&self, chat: ChatIdent) -> Result<Vec<UserRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(AUDIENCE_SQL)?;
        let rows = stmt.query_map([chat.as_i64()], row_to_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn remove(&self, chat: ChatIdent, user: UserIdent) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        // The users row stays — the user may be on other chats' rosters.
        let n = conn.execute(
            "DELETE FROM chat_members WHERE chat_id = ?1 AND user_id = ?2",
            rusqlite::params![chat.as_i64(), user.as_i64()],
        )?;
        debug!(chat = %chat, user = %user, removed = n, "roster: member removed");
        Ok(())
    }

    fn record_private_chat(&self, user: &UserRecord, chat: ChatIdent) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO users (id, first_name, last_name, username, private_chat,
                                first_seen_at, last_seen_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(id) DO UPDATE SET
                private_chat = excluded.private_chat,
                last_seen_at = excluded.last_seen_at",
            rusqlite::params![
                user.id.as_i64(),
                user.first_name,
                user.last_name,
                user.username,
                chat.as_i64(),
                now
            ],
        )?;
        Ok(())
    }

    fn set_salutation(&self, user: UserIdent, salutation: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE users SET salutation = ?2 WHERE id = ?1",
            rusqlite::params![user.as_i64(), salutation],
        )?;
        if n == 0 {
            return Err(RosterError::UnknownUser(user));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> SqliteRoster {
        SqliteRoster::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn user(id: i64, first: &str) -> UserRecord {
        UserRecord::new(id, first)
    }

    #[test]
    fn audience_preserves_observation_order() {
        let r = roster();
        let chat = ChatIdent(-100);
        r.upsert(chat, &user(3, "C")).unwrap();
        r.upsert(chat, &user(1, "A")).unwrap();
        r.upsert(chat, &user(2, "B")).unwrap();

        let ids: Vec<i64> = r
            .audience_of(chat)
            .unwrap()
            .iter()
            .map(|u| u.id.as_i64())
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn repeat_observation_does_not_duplicate() {
        let r = roster();
        let chat = ChatIdent(-100);
        r.upsert(chat, &user(1, "Ann")).unwrap();
        r.upsert(chat, &user(1, "Ann")).unwrap();
        assert_eq!(r.audience_of(chat).unwrap().len(), 1);
    }

    #[test]
    fn repeat_observation_refreshes_display_fields() {
        let r = roster();
        let chat = ChatIdent(-100);
        r.upsert(chat, &user(1, "Ann")).unwrap();

        let mut renamed = user(1, "Anna");
        renamed.username = Some("anna".into());
        r.upsert(chat, &renamed).unwrap();

        let audience = r.audience_of(chat).unwrap();
        assert_eq!(audience[0].first_name, "Anna");
        assert_eq!(audience[0].username.as_deref(), Some("anna"));
    }

    #[test]
    fn upsert_never_clears_salutation_or_private_chat() {
        let r = roster();
        let chat = ChatIdent(-100);
        r.record_private_chat(&user(1, "Ann"), ChatIdent(555)).unwrap();
        r.set_salutation(UserIdent(1), "Annie").unwrap();

        // A later group observation carries neither attribute.
        r.upsert(chat, &user(1, "Ann")).unwrap();

        let audience = r.audience_of(chat).unwrap();
        assert_eq!(audience[0].salutation.as_deref(), Some("Annie"));
        assert_eq!(audience[0].private_chat, Some(ChatIdent(555)));
    }

    #[test]
    fn remove_affects_only_that_chat() {
        let r = roster();
        let (a, b) = (ChatIdent(-1), ChatIdent(-2));
        r.upsert(a, &user(1, "Ann")).unwrap();
        r.upsert(b, &user(1, "Ann")).unwrap();

        r.remove(a, UserIdent(1)).unwrap();

        assert!(r.audience_of(a).unwrap().is_empty());
        assert_eq!(r.audience_of(b).unwrap().len(), 1);
    }

    #[test]
    fn salutation_for_unknown_user_is_an_error() {
        let r = roster();
        assert!(matches!(
            r.set_salutation(UserIdent(9), "X"),
            Err(RosterError::UnknownUser(_))
        ));
    }

    #[test]
    fn private_chat_first_contact_creates_the_user() {
        let r = roster();
        r.record_private_chat(&user(7, "Newcomer"), ChatIdent(700)).unwrap();
        // Now known to the store, so the salutation setter works.
        r.set_salutation(UserIdent(7), "Hey you").unwrap();
    }

    #[test]
    fn empty_chat_has_empty_audience() {
        let r = roster();
        assert!(r.audience_of(ChatIdent(-42)).unwrap().is_empty());
    }
}
