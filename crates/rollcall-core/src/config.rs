use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (rollcall.toml + ROLLCALL_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollcallConfig {
    pub bot: BotConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub limits: RateLimitConfig,
    #[serde(default)]
    pub triggers: TriggerConfig,
    #[serde(default)]
    pub mention: MentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub token: String,
}

/// Which roster backend to open at startup. The engine only ever sees the
/// `RosterStore` trait, so switching backends is a config-only change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
        }
    }
}

/// Sliding-window rate limit applied to notify-worthy triggers, per chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Accepted triggers per window before throttling kicks in.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            window_secs: default_window_secs(),
        }
    }
}

/// Trigger vocabulary. Matching is case-insensitive substring containment,
/// so `"@all"` also fires on `"wake up @ALL please"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "default_all_aliases")]
    pub all: Vec<String>,
    #[serde(default = "default_admin_aliases")]
    pub admins: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            all: default_all_aliases(),
            admins: default_admin_aliases(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionConfig {
    /// Joins mention tokens in the group message.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// When true, each confirmed audience member with a recorded private
    /// chat also receives an individual notice after the group send.
    #[serde(default)]
    pub private_fanout: bool,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            private_fanout: false,
        }
    }
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.rollcall/rollcall.db", home)
}

fn default_capacity() -> usize {
    1
}

fn default_window_secs() -> u64 {
    5
}

fn default_all_aliases() -> Vec<String> {
    ["/all", "@all", "/everyone", "@everyone"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_admin_aliases() -> Vec<String> {
    ["/admins", "@admins", "/administrators", "@administrators"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_separator() -> String {
    "\n".to_string()
}

impl RollcallConfig {
    /// Load config from a TOML file with ROLLCALL_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.rollcall/rollcall.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: RollcallConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("ROLLCALL_").split("_"))
            .extract()
            .map_err(|e| crate::error::RollcallError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.rollcall/rollcall.toml", home)
}
