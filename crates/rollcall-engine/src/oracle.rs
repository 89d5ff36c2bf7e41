use async_trait::async_trait;
use thiserror::Error;

use rollcall_core::types::{ChatIdent, MembershipStatus, UserIdent};

/// The oracle could not answer. The resolver treats this as "not eligible"
/// for the affected user only — resolution continues for the rest.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("membership check failed: {0}")]
    Unavailable(String),
}

/// External authority on a user's live status within a chat.
///
/// Every call is a bounded request — the implementation's own timeout
/// surfaces as an `OracleError`, never a hang.
#[async_trait]
pub trait MembershipOracle: Send + Sync {
    async fn status_of(
        &self,
        chat: ChatIdent,
        user: UserIdent,
    ) -> std::result::Result<MembershipStatus, OracleError>;
}
