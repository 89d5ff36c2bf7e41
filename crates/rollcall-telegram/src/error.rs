/// Errors produced while bringing the Telegram adapter up.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("no bot token configured")]
    NoToken,
}
