//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling event
//! loop until the process exits.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use rollcall_core::config::BotConfig;
use rollcall_engine::MentionEngine;
use rollcall_roster::RosterStore;

use crate::channel::BotChannel;
use crate::error::TelegramError;
use crate::handler;
use crate::oracle::BotOracle;

/// The engine as wired for Telegram: Bot API oracle and channel.
pub type TelegramEngine = MentionEngine<BotOracle, BotChannel>;

pub struct TelegramAdapter {
    bot: Bot,
    engine: Arc<TelegramEngine>,
    roster: Arc<dyn RosterStore>,
}

impl TelegramAdapter {
    /// Build the `Bot` from config, refusing to start without a token.
    pub fn connect(config: &BotConfig) -> Result<Bot, TelegramError> {
        if config.token.trim().is_empty() {
            return Err(TelegramError::NoToken);
        }
        Ok(Bot::new(&config.token))
    }

    pub fn new(bot: Bot, engine: Arc<TelegramEngine>, roster: Arc<dyn RosterStore>) -> Self {
        Self { bot, engine, roster }
    }

    /// Drive the long-polling loop. Never returns — runs for the lifetime
    /// of the process.
    pub async fn run(self) {
        info!("Telegram: starting long-polling dispatcher");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handler::handle_message))
            .branch(Update::filter_my_chat_member().endpoint(handler::handle_membership_change));

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.engine, self.roster])
            .default_handler(|_upd| async {})
            .build()
            .dispatch()
            .await;
    }
}
