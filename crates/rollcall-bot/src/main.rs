use std::sync::Arc;

use tracing::info;

use rollcall_core::config::{RollcallConfig, StorageBackend};
use rollcall_engine::{MentionEngine, RateLimiter, TriggerSet};
use rollcall_roster::{MemoryRoster, RosterStore, SqliteRoster};
use rollcall_telegram::{BotChannel, BotOracle, TelegramAdapter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rollcall_bot=info,rollcall_engine=info,rollcall_telegram=info,rollcall_roster=info"
                    .into()
            }),
        )
        .init();

    // load config: explicit path via ROLLCALL_CONFIG env > ~/.rollcall/rollcall.toml
    let config_path = std::env::var("ROLLCALL_CONFIG").ok();
    let config = RollcallConfig::load(config_path.as_deref())?;

    let roster: Arc<dyn RosterStore> = match config.database.backend {
        StorageBackend::Sqlite => {
            ensure_parent_dir(&config.database.path);
            info!(path = %config.database.path, "opening SQLite roster");
            Arc::new(SqliteRoster::open(&config.database.path)?)
        }
        StorageBackend::Memory => {
            info!("using in-memory roster (lost on restart)");
            Arc::new(MemoryRoster::new())
        }
    };

    let bot = TelegramAdapter::connect(&config.bot)?;

    let engine = Arc::new(MentionEngine::new(
        Arc::clone(&roster),
        BotOracle::new(bot.clone()),
        BotChannel::new(bot.clone()),
        RateLimiter::from_config(&config.limits),
        TriggerSet::from_config(&config.triggers),
        &config.mention,
    ));

    TelegramAdapter::new(bot, engine, roster).run().await;
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
