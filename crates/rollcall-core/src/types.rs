use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a chat. Telegram assigns negative ids to group and supergroup
/// chats, positive ids to one-to-one chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatIdent(pub i64);

impl ChatIdent {
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Group and supergroup chats carry negative ids.
    pub fn is_group(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for ChatIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatIdent {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Stable numeric user identity. The only valid equality key for users —
/// public handles are display-only and may be absent or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdent(pub i64);

impl UserIdent {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserIdent {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A user as the roster knows them.
///
/// `salutation` and `private_chat` are long-lived attributes recorded outside
/// the normal observation path (see `RosterStore`); upserts built from
/// inbound events leave them `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserIdent,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Public handle, without the leading `@`. Display-only.
    pub username: Option<String>,
    /// Preferred greeting for private notices ("/callme").
    pub salutation: Option<String>,
    /// One-to-one chat with the bot, recorded the first time the user
    /// messages it directly. Required for private fan-out.
    pub private_chat: Option<ChatIdent>,
}

impl UserRecord {
    pub fn new(id: impl Into<UserIdent>, first_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: None,
            username: None,
            salutation: None,
            private_chat: None,
        }
    }

    /// "First" or "First Last" — the name shown inside mention links.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// The greeting used in private notices: salutation when recorded,
    /// first name otherwise.
    pub fn greeting_name(&self) -> &str {
        self.salutation.as_deref().unwrap_or(&self.first_name)
    }
}

// Identity is the only equality key. Two handle-less users must stay
// distinct, and a renamed user must stay the same person.
impl PartialEq for UserRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserRecord {}

impl Hash for UserRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Live membership status as reported by the chat platform.
///
/// `Left` covers both voluntary departure and removal; `Unknown` covers
/// everything the platform reports that maps to no clear eligibility
/// (e.g. restricted members) and is treated as not eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Member,
    Administrator,
    Creator,
    Left,
    Unknown,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipStatus::Member => write!(f, "member"),
            MembershipStatus::Administrator => write!(f, "administrator"),
            MembershipStatus::Creator => write!(f, "creator"),
            MembershipStatus::Left => write!(f, "left"),
            MembershipStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Which slice of the roster a trigger addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceClass {
    All,
    Admins,
}

impl AudienceClass {
    /// Acceptance set for this class. All → {member, administrator, creator};
    /// Admins → {administrator, creator}.
    pub fn accepts(&self, status: MembershipStatus) -> bool {
        match self {
            AudienceClass::All => matches!(
                status,
                MembershipStatus::Member
                    | MembershipStatus::Administrator
                    | MembershipStatus::Creator
            ),
            AudienceClass::Admins => matches!(
                status,
                MembershipStatus::Administrator | MembershipStatus::Creator
            ),
        }
    }
}

impl fmt::Display for AudienceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudienceClass::All => write!(f, "all"),
            AudienceClass::Admins => write!(f, "admins"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_chats_have_negative_ids() {
        assert!(ChatIdent(-100_123).is_group());
        assert!(!ChatIdent(42).is_group());
    }

    #[test]
    fn user_equality_ignores_display_fields() {
        let a = UserRecord {
            username: Some("alice".into()),
            ..UserRecord::new(1, "Alice")
        };
        let b = UserRecord::new(1, "Renamed");
        assert_eq!(a, b);
    }

    #[test]
    fn handle_less_users_stay_distinct() {
        let a = UserRecord::new(1, "Anna");
        let b = UserRecord::new(2, "Anna");
        assert_ne!(a, b);
    }

    #[test]
    fn display_name_includes_last_name_when_present() {
        let mut u = UserRecord::new(7, "Ada");
        assert_eq!(u.display_name(), "Ada");
        u.last_name = Some("Lovelace".into());
        assert_eq!(u.display_name(), "Ada Lovelace");
    }

    #[test]
    fn all_class_accepts_plain_members() {
        assert!(AudienceClass::All.accepts(MembershipStatus::Member));
        assert!(AudienceClass::All.accepts(MembershipStatus::Creator));
        assert!(!AudienceClass::All.accepts(MembershipStatus::Left));
        assert!(!AudienceClass::All.accepts(MembershipStatus::Unknown));
    }

    #[test]
    fn admins_class_rejects_plain_members() {
        assert!(!AudienceClass::Admins.accepts(MembershipStatus::Member));
        assert!(AudienceClass::Admins.accepts(MembershipStatus::Administrator));
        assert!(AudienceClass::Admins.accepts(MembershipStatus::Creator));
    }

    #[test]
    fn greeting_prefers_salutation() {
        let mut u = UserRecord::new(3, "Robert");
        assert_eq!(u.greeting_name(), "Robert");
        u.salutation = Some("Bob".into());
        assert_eq!(u.greeting_name(), "Bob");
    }
}
