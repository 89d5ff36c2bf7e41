use rollcall_core::types::{ChatIdent, UserIdent, UserRecord};

use crate::error::Result;

/// Persistence contract for the roster.
///
/// All mutation of chat↔user associations goes through this trait; transport
/// code never touches the backing store directly. Implementations must be
/// safe to call concurrently for different chats.
pub trait RosterStore: Send + Sync {
    /// Record that `user` was observed in `chat`.
    ///
    /// Append-only and idempotent: a repeat observation refreshes the
    /// display fields (names, handle) and never duplicates the entry.
    /// Stored `salutation`/`private_chat` values are left untouched.
    fn upsert(&self, chat: ChatIdent, user: &UserRecord) -> Result<()>;

    /// Every user ever observed in `chat`, in observation order, deduplicated
    /// by identity.
    fn audience_of(&self, chat: ChatIdent) -> Result<Vec<UserRecord>>;

    /// Drop `user` from the roster of `chat`. Called when a live membership
    /// check confirms the user left; other chats are unaffected.
    fn remove(&self, chat: ChatIdent, user: UserIdent) -> Result<()>;

    /// Record the one-to-one chat a user shares with the bot, creating the
    /// user if this direct contact is the first observation.
    fn record_private_chat(&self, user: &UserRecord, chat: ChatIdent) -> Result<()>;

    /// Store the preferred greeting used in private notices.
    fn set_salutation(&self, user: UserIdent, salutation: &str) -> Result<()>;
}
