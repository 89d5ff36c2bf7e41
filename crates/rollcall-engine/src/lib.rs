//! `rollcall-engine` — the mention orchestration engine.
//!
//! # Overview
//!
//! Inbound events enter through [`engine::MentionEngine::handle_event`]:
//!
//! 1. roster upsert (every human participant observed)
//! 2. trigger detection ([`triggers::TriggerSet`])
//! 3. audience resolution against live membership ([`resolver`])
//! 4. empty-audience short-circuit, else the rate-limit gate ([`limiter`])
//! 5. MarkdownV2-safe composition ([`composer`])
//! 6. delivery with fallback and best-effort failure notices, then optional
//!    private fan-out ([`delivery`])
//!
//! The engine talks to the outside world only through three contracts:
//! `RosterStore` (rollcall-roster), [`oracle::MembershipOracle`] and
//! [`channel::MessageChannel`]. Expected outcomes — empty audience,
//! throttled — are explicit [`engine::EngineOutcome`] values, never errors.

pub mod channel;
pub mod composer;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod limiter;
pub mod notices;
pub mod oracle;
pub mod resolver;
pub mod triggers;

pub use channel::{ChannelError, MessageChannel};
pub use delivery::{DeliveryCoordinator, DeliveryOutcome, FanoutOutcome, FanoutReport};
pub use engine::{EngineOutcome, MentionEngine, MentionRequest};
pub use error::{EngineError, Result};
pub use limiter::{Gate, RateLimiter};
pub use oracle::{MembershipOracle, OracleError};
pub use triggers::TriggerSet;
