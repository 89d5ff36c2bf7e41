//! Update handlers registered in the teloxide Dispatcher.
//!
//! Normalization only: filter bots, map users and ids onto core types, hand
//! the event to the engine and log its outcome. All mention policy lives in
//! `rollcall-engine`.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, User};
use tracing::{debug, error};

use rollcall_core::event::InboundEvent;
use rollcall_core::types::{ChatIdent, UserRecord};
use rollcall_engine::{composer, notices};
use rollcall_roster::RosterStore;

use crate::adapter::TelegramEngine;

/// Message handler. Group messages are normalized and handed to the engine;
/// direct messages get the private-chat treatment (one-to-one chat
/// recording, `/callme`, group-only notice).
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    engine: Arc<TelegramEngine>,
    roster: Arc<dyn RosterStore>,
) -> ResponseResult<()> {
    // Ignore messages from other bots.
    let from = match msg.from.as_ref() {
        Some(u) if !u.is_bot => u,
        _ => return Ok(()),
    };

    if msg.chat.is_private() {
        return handle_private(bot, &msg, from, roster).await;
    }

    let event = InboundEvent::Message {
        chat: ChatIdent(msg.chat.id.0),
        chat_title: msg.chat.title().map(str::to_string),
        author: user_record(from),
        text: msg.text().unwrap_or("").to_string(),
        message_id: msg.id.0 as i64,
    };

    match engine.handle_event(event).await {
        Ok(outcome) => debug!(chat = msg.chat.id.0, ?outcome, "update processed"),
        Err(e) => error!(chat = msg.chat.id.0, error = %e, "mention engine failed"),
    }
    Ok(())
}

/// Membership-change handler (`my_chat_member`): the initiating human user
/// was observed, so the roster learns about them — or, for a private chat,
/// the one-to-one channel gets recorded for fan-out.
pub async fn handle_membership_change(
    upd: ChatMemberUpdated,
    engine: Arc<TelegramEngine>,
    roster: Arc<dyn RosterStore>,
) -> ResponseResult<()> {
    if upd.from.is_bot {
        return Ok(());
    }

    let chat = ChatIdent(upd.chat.id.0);
    if upd.chat.is_private() {
        // The user started (or unblocked) the bot — that is our one-to-one
        // channel for private fan-out.
        if let Err(e) = roster.record_private_chat(&user_record(&upd.from), chat) {
            error!(user = upd.from.id.0, error = %e, "failed to record private chat");
        }
        return Ok(());
    }

    let event = InboundEvent::MembershipChange {
        chat,
        user: user_record(&upd.from),
    };
    if let Err(e) = engine.handle_event(event).await {
        error!(chat = %chat, error = %e, "mention engine failed");
    }
    Ok(())
}

async fn handle_private(
    bot: Bot,
    msg: &Message,
    from: &User,
    roster: Arc<dyn RosterStore>,
) -> ResponseResult<()> {
    let record = user_record(from);
    let chat = ChatIdent(msg.chat.id.0);

    if let Err(e) = roster.record_private_chat(&record, chat) {
        error!(user = %record.id, error = %e, "failed to record private chat");
    }

    let text = msg.text().unwrap_or("").trim();
    let response = match callme_argument(text) {
        Some("") => "Usage: /callme <name>".to_string(),
        Some(name) => match roster.set_salutation(record.id, name) {
            Ok(()) => format!("Got it. I will call you {name}"),
            Err(e) => {
                error!(user = %record.id, error = %e, "failed to store salutation");
                "Could not remember that, sorry".to_string()
            }
        },
        None => notices::GROUP_ONLY.to_string(),
    };

    let escaped = composer::escape_markdown_v2(&response);
    if let Err(e) = bot
        .send_message(msg.chat.id, escaped)
        .parse_mode(teloxide::types::ParseMode::MarkdownV2)
        .await
    {
        error!(chat = %chat, error = %e, "private reply failed");
    }
    Ok(())
}

/// `Some(name)` when `text` is a /callme invocation (name may be empty),
/// `None` otherwise.
fn callme_argument(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("/callme")?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None; // e.g. "/callmeback"
    }
    Some(rest.trim())
}

fn user_record(user: &User) -> UserRecord {
    UserRecord {
        id: (user.id.0 as i64).into(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        salutation: None,
        private_chat: None,
    }
}
