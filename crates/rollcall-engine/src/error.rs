use thiserror::Error;

/// Errors that abort a request. Channel and oracle failures are handled
/// inside the engine (fallback, fail-closed exclusion) and never surface
/// here; only roster storage faults are fatal to the current request.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Roster storage error: {0}")]
    Storage(#[from] rollcall_roster::RosterError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
