//! Fixed user-facing notices, stored unescaped. Callers pass them through
//! `composer::escape_markdown_v2` like any other templated text.

/// Reply when a trigger resolves to an empty audience.
pub const NO_ELIGIBLE_MEMBERS: &str = "Could not find anyone suitable to mention";

/// Reply when the rate limiter rejects a trigger.
pub const THROTTLED: &str = "Easy on the mentions. Give the chat a break!";

/// Best-effort apology when the mention itself could not be delivered.
pub const SEND_FAILED: &str = "Something went wrong and the mention could not be delivered";

/// Reply to direct messages that are not a known command.
pub const GROUP_ONLY: &str = "This bot is meant for group chats";
