use crate::types::{ChatIdent, UserRecord};

/// Shape-normalized inbound event.
///
/// The transport adapter (long polling or webhook — the engine does not
/// care) translates raw platform updates into this enum before handing them
/// to `MentionEngine::handle_event`. Bot accounts are filtered out by the
/// transport; every participant reaching the engine is human and gets a
/// roster upsert regardless of whether the event also matches a trigger.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A membership-change notification (e.g. Telegram `my_chat_member`):
    /// the initiating user was observed in the chat.
    MembershipChange { chat: ChatIdent, user: UserRecord },

    /// A text message posted to a group chat.
    Message {
        chat: ChatIdent,
        /// Group title, used in private fan-out notices.
        chat_title: Option<String>,
        author: UserRecord,
        text: String,
        /// Id of the message, used as the reply target.
        message_id: i64,
    },
}

impl InboundEvent {
    pub fn chat(&self) -> ChatIdent {
        match self {
            InboundEvent::MembershipChange { chat, .. } => *chat,
            InboundEvent::Message { chat, .. } => *chat,
        }
    }
}
