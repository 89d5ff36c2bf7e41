use rollcall_core::types::UserIdent;
use thiserror::Error;

/// Roster storage errors. Fatal to the request that hit them — the engine
/// propagates these instead of guessing at an audience.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown user: {0}")]
    UnknownUser(UserIdent),
}

pub type Result<T> = std::result::Result<T, RosterError>;
