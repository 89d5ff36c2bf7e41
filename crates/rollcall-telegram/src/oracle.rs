//! Live membership checks over the Bot API's `getChatMember`.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, UserId};

use rollcall_core::types::{ChatIdent, MembershipStatus, UserIdent};
use rollcall_engine::{MembershipOracle, OracleError};

/// Asks Telegram for a user's live status in a chat. Every call is one
/// bounded HTTP request; the client's timeout turns a hang into an
/// `OracleError`, which the resolver treats as not-eligible.
pub struct BotOracle {
    bot: Bot,
}

impl BotOracle {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MembershipOracle for BotOracle {
    async fn status_of(
        &self,
        chat: ChatIdent,
        user: UserIdent,
    ) -> Result<MembershipStatus, OracleError> {
        let member = self
            .bot
            .get_chat_member(ChatId(chat.as_i64()), UserId(user.as_i64() as u64))
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        Ok(map_status(&member.kind))
    }
}

/// Collapse Telegram's member kinds onto the engine's status set.
///
/// Banned counts as Left (removed is removed); Restricted stays Unknown —
/// still in the chat, but with no clear mention eligibility.
pub(crate) fn map_status(kind: &ChatMemberKind) -> MembershipStatus {
    if kind.is_owner() {
        MembershipStatus::Creator
    } else if kind.is_administrator() {
        MembershipStatus::Administrator
    } else if kind.is_member() {
        MembershipStatus::Member
    } else if kind.is_left() || kind.is_banned() {
        MembershipStatus::Left
    } else {
        MembershipStatus::Unknown
    }
}
