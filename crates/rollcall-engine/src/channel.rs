use async_trait::async_trait;
use thiserror::Error;

use rollcall_core::types::ChatIdent;

/// Delivery failure, split the only way the coordinator cares about:
/// a vanished reply target gets exactly one fallback resend, everything
/// else gets the best-effort apology path.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("reply target no longer exists")]
    ReplyTargetGone,

    #[error("channel failure: {0}")]
    Failed(String),
}

/// Outbound message surface. Text is already fully escaped when it reaches
/// this trait — implementations send it verbatim.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Send `text` to `chat` as a reply to `reply_to`.
    async fn reply(
        &self,
        chat: ChatIdent,
        text: &str,
        reply_to: i64,
    ) -> std::result::Result<(), ChannelError>;

    /// Send `text` to `chat` as a standalone message.
    async fn send(&self, chat: ChatIdent, text: &str) -> std::result::Result<(), ChannelError>;
}
