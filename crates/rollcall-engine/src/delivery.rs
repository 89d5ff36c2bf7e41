//! The delivery state machine and private fan-out.
//!
//! COMPOSED → reply attempt → `Sent`
//!          → reply target gone → one fallback resend → `Sent` | apology
//!          → any other failure → best-effort apology → `Failed` | `Suppressed`
//!
//! The apology's own failure is logged and swallowed, never re-raised.

use tracing::{debug, error, warn};

use rollcall_core::types::{ChatIdent, UserIdent, UserRecord};

use crate::channel::{ChannelError, MessageChannel};
use crate::composer::{compose_fanout_notice, escape_markdown_v2};
use crate::notices;

/// Terminal state of one group delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The body reached the chat — directly, or via the fallback resend
    /// after the reply target disappeared.
    Sent { fallback: bool },
    /// The body did not go out; the apology notice did.
    Failed,
    /// Neither the body nor the apology went out.
    Suppressed,
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}

/// What happened to one fan-out recipient. Collected explicitly so the
/// caller can log or assert on every recipient instead of losing failures
/// to silent suppression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanoutOutcome {
    Delivered,
    /// No one-to-one chat on record — the user never messaged the bot.
    NoPrivateChannel,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutReport {
    pub recipient: UserIdent,
    pub outcome: FanoutOutcome,
}

/// Drives sends through the channel contract. Owns no policy about *what*
/// to send — bodies and notices arrive composed; this type only sequences
/// attempts and classifies terminal states.
pub struct DeliveryCoordinator<C> {
    channel: C,
}

impl<C: MessageChannel> DeliveryCoordinator<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Deliver the composed mention body, replying to the trigger message.
    pub async fn deliver(&self, chat: ChatIdent, body: &str, reply_to: i64) -> DeliveryOutcome {
        match self.channel.reply(chat, body, reply_to).await {
            Ok(()) => DeliveryOutcome::Sent { fallback: false },
            Err(ChannelError::ReplyTargetGone) => {
                // The trigger message was deleted under us — resend the
                // identical body standalone, exactly once.
                debug!(chat = %chat, reply_to, "reply target gone; resending as new message");
                match self.channel.send(chat, body).await {
                    Ok(()) => DeliveryOutcome::Sent { fallback: true },
                    Err(e) => self.apologise(chat, e).await,
                }
            }
            Err(e) => self.apologise(chat, e).await,
        }
    }

    async fn apologise(&self, chat: ChatIdent, cause: ChannelError) -> DeliveryOutcome {
        error!(chat = %chat, error = %cause, "mention delivery failed");
        let text = escape_markdown_v2(notices::SEND_FAILED);
        match self.channel.send(chat, &text).await {
            Ok(()) => DeliveryOutcome::Failed,
            Err(e) => {
                warn!(chat = %chat, error = %e, "failure notice also failed; suppressing");
                DeliveryOutcome::Suppressed
            }
        }
    }

    /// Best-effort short-circuit notice (throttle, empty audience), replying
    /// to the trigger message. Falls back to a standalone send when the
    /// reply target is gone; any other failure is logged and swallowed.
    pub async fn notice(&self, chat: ChatIdent, text: &str, reply_to: i64) {
        let escaped = escape_markdown_v2(text);
        match self.channel.reply(chat, &escaped, reply_to).await {
            Ok(()) => {}
            Err(ChannelError::ReplyTargetGone) => {
                if let Err(e) = self.channel.send(chat, &escaped).await {
                    warn!(chat = %chat, error = %e, "notice fallback failed");
                }
            }
            Err(e) => warn!(chat = %chat, error = %e, "notice failed"),
        }
    }

    /// Private fan-out: one individually composed notice per audience member
    /// with a recorded one-to-one chat. Failures are isolated per recipient;
    /// the group delivery that preceded this is unaffected either way.
    pub async fn fan_out(
        &self,
        audience: &[UserRecord],
        chat_title: Option<&str>,
        author: &UserRecord,
    ) -> Vec<FanoutReport> {
        let mut reports = Vec::with_capacity(audience.len());
        for member in audience {
            let outcome = match member.private_chat {
                Some(private) => {
                    let text = compose_fanout_notice(member, chat_title, author);
                    match self.channel.send(private, &text).await {
                        Ok(()) => FanoutOutcome::Delivered,
                        Err(e) => {
                            warn!(user = %member.id, error = %e, "private notice failed");
                            FanoutOutcome::Failed(e.to_string())
                        }
                    }
                }
                None => FanoutOutcome::NoPrivateChannel,
            };
            reports.push(FanoutReport {
                recipient: member.id,
                outcome,
            });
        }
        reports
    }
}
