//! `rollcall-telegram` — the Telegram transport adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher`, normalizes raw updates into
//! `InboundEvent`s, and implements the engine's collaborator contracts over
//! the Bot API: [`oracle::BotOracle`] (`getChatMember`) and
//! [`channel::BotChannel`] (`sendMessage` with MarkdownV2 and reply
//! parameters). Long polling — no public URL required.

pub mod adapter;
pub mod channel;
pub mod error;
pub mod handler;
pub mod oracle;

pub use adapter::{TelegramAdapter, TelegramEngine};
pub use channel::BotChannel;
pub use error::TelegramError;
pub use oracle::BotOracle;
