//! Outbound sends over the Bot API.
//!
//! Bodies arrive fully escaped from the composer, so every send goes out as
//! MarkdownV2 with notifications on — mention deep links only ping people
//! when delivered as a parsed entity.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode, ReplyParameters};
use teloxide::{ApiError, RequestError};

use rollcall_core::types::ChatIdent;
use rollcall_engine::{ChannelError, MessageChannel};

pub struct BotChannel {
    bot: Bot,
}

impl BotChannel {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageChannel for BotChannel {
    async fn reply(&self, chat: ChatIdent, text: &str, reply_to: i64) -> Result<(), ChannelError> {
        self.bot
            .send_message(ChatId(chat.as_i64()), text)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_parameters(ReplyParameters::new(MessageId(reply_to as i32)))
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn send(&self, chat: ChatIdent, text: &str) -> Result<(), ChannelError> {
        self.bot
            .send_message(ChatId(chat.as_i64()), text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .map(|_| ())
            .map_err(classify)
    }
}

/// Split channel failures the one way the delivery coordinator cares about:
/// a vanished reply target versus everything else.
fn classify(err: RequestError) -> ChannelError {
    match err {
        RequestError::Api(ApiError::MessageToReplyNotFound) => ChannelError::ReplyTargetGone,
        // Some Bot API deployments word this error differently and teloxide
        // surfaces it as Unknown.
        RequestError::Api(ApiError::Unknown(ref text))
            if text.contains("message to be replied not found")
                || text.contains("replied message not found") =>
        {
            ChannelError::ReplyTargetGone
        }
        other => ChannelError::Failed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_target_gone_is_classified() {
        let err = RequestError::Api(ApiError::MessageToReplyNotFound);
        assert!(matches!(classify(err), ChannelError::ReplyTargetGone));
    }

    #[test]
    fn unknown_wording_is_still_reply_target_gone() {
        let err = RequestError::Api(ApiError::Unknown(
            "Bad Request: message to be replied not found".into(),
        ));
        assert!(matches!(classify(err), ChannelError::ReplyTargetGone));
    }

    #[test]
    fn other_api_errors_are_plain_failures() {
        let err = RequestError::Api(ApiError::Unknown("Bad Request: chat not found".into()));
        assert!(matches!(classify(err), ChannelError::Failed(_)));
    }
}
