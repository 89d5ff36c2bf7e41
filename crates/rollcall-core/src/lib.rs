//! `rollcall-core` — shared identity types, the normalized inbound event,
//! configuration loading and the top-level error type.
//!
//! Everything here is transport-agnostic: the Telegram adapter translates
//! raw updates into these types before the engine ever sees them.

pub mod config;
pub mod error;
pub mod event;
pub mod types;

pub use config::RollcallConfig;
pub use error::{Result, RollcallError};
pub use event::InboundEvent;
pub use types::{AudienceClass, ChatIdent, MembershipStatus, UserIdent, UserRecord};
