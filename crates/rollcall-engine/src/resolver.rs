//! Audience resolution: roster ∩ live membership, author excluded.
//!
//! Every candidate is confirmed against the membership oracle at resolution
//! time. A candidate the oracle reports as gone is excluded AND removed from
//! the roster (self-healing); an oracle failure excludes only that candidate
//! (fail-closed) and never aborts the rest of the resolution.

use std::collections::HashSet;

use tracing::{debug, warn};

use rollcall_core::types::{AudienceClass, ChatIdent, MembershipStatus, UserIdent, UserRecord};
use rollcall_roster::RosterStore;

use crate::error::Result;
use crate::oracle::MembershipOracle;

/// Resolve the audience for a trigger in `chat`.
///
/// The result preserves the roster's observation order, is deduplicated by
/// identity and never contains `author`. Only roster storage faults abort.
pub async fn resolve_audience<O: MembershipOracle>(
    roster: &dyn RosterStore,
    oracle: &O,
    chat: ChatIdent,
    author: UserIdent,
    class: AudienceClass,
) -> Result<Vec<UserRecord>> {
    let candidates = roster.audience_of(chat)?;

    let mut audience = Vec::new();
    let mut seen: HashSet<UserIdent> = HashSet::new();
    for candidate in candidates {
        if candidate.id == author {
            continue;
        }
        if !seen.insert(candidate.id) {
            continue;
        }

        match oracle.status_of(chat, candidate.id).await {
            Ok(MembershipStatus::Left) => {
                // Confirmed gone — heal the roster so the next resolution
                // doesn't pay for this candidate again.
                debug!(chat = %chat, user = %candidate.id, "left the chat; removing from roster");
                roster.remove(chat, candidate.id)?;
            }
            Ok(status) if class.accepts(status) => audience.push(candidate),
            Ok(status) => {
                // Still a roster member, just not in this class's acceptance
                // set (e.g. a plain member under an admin trigger).
                debug!(chat = %chat, user = %candidate.id, %status, %class, "not eligible");
            }
            Err(e) => {
                warn!(chat = %chat, user = %candidate.id, error = %e, "membership check failed; excluding");
            }
        }
    }

    Ok(audience)
}
