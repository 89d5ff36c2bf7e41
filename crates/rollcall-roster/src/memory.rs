use dashmap::DashMap;

use rollcall_core::types::{ChatIdent, UserIdent, UserRecord};

use crate::error::{Result, RosterError};
use crate::store::RosterStore;

#[derive(Debug, Default, Clone)]
struct UserAttrs {
    salutation: Option<String>,
    private_chat: Option<ChatIdent>,
}

/// In-memory roster. Used by the test suite and by `backend = "memory"`
/// deployments where losing the roster on restart is acceptable.
///
/// DashMap's per-key locking gives the same per-chat atomicity the contract
/// asks for: mutations of different chats never contend.
#[derive(Default)]
pub struct MemoryRoster {
    /// Chat → members in observation order, deduplicated by identity.
    chats: DashMap<ChatIdent, Vec<UserRecord>>,
    /// User attributes that outlive any single chat roster.
    attrs: DashMap<UserIdent, UserAttrs>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    fn merge_attrs(&self, user: &mut UserRecord) {
        if let Some(attrs) = self.attrs.get(&user.id) {
            user.salutation = attrs.salutation.clone();
            user.private_chat = attrs.private_chat;
        }
    }
}

impl RosterStore for MemoryRoster {
    fn upsert(&self, chat: ChatIdent, user: &UserRecord) -> Result<()> {
        let mut members = self.chats.entry(chat).or_default();
        match members.iter_mut().find(|m| m.id == user.id) {
            Some(existing) => {
                existing.first_name = user.first_name.clone();
                existing.last_name = user.last_name.clone();
                existing.username = user.username.clone();
            }
            None => members.push(user.clone()),
        }
        Ok(())
    }

    fn audience_of(&self, chat: ChatIdent) -> Result<Vec<UserRecord>> {
        let mut members = self
            .chats
            .get(&chat)
            .map(|m| m.value().clone())
            .unwrap_or_default();
        for member in &mut members {
            self.merge_attrs(member);
        }
        Ok(members)
    }

    fn remove(&self, chat: ChatIdent, user: UserIdent) -> Result<()> {
        if let Some(mut members) = self.chats.get_mut(&chat) {
            members.retain(|m| m.id != user);
        }
        Ok(())
    }

    fn record_private_chat(&self, user: &UserRecord, chat: ChatIdent) -> Result<()> {
        self.attrs.entry(user.id).or_default().private_chat = Some(chat);
        Ok(())
    }

    fn set_salutation(&self, user: UserIdent, salutation: &str) -> Result<()> {
        match self.attrs.get_mut(&user) {
            Some(mut attrs) => {
                attrs.salutation = Some(salutation.to_string());
                Ok(())
            }
            None => {
                // Mirror the SQLite backend: users observed in some chat are
                // known even without prior attributes.
                let known = self
                    .chats
                    .iter()
                    .any(|entry| entry.value().iter().any(|m| m.id == user));
                if !known {
                    return Err(RosterError::UnknownUser(user));
                }
                self.attrs.entry(user).or_default().salutation = Some(salutation.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, first: &str) -> UserRecord {
        UserRecord::new(id, first)
    }

    #[test]
    fn observation_order_is_stable() {
        let r = MemoryRoster::new();
        let chat = ChatIdent(-5);
        for (id, name) in [(9, "Ida"), (4, "Dan"), (6, "Fay")] {
            r.upsert(chat, &user(id, name)).unwrap();
        }
        let ids: Vec<i64> = r
            .audience_of(chat)
            .unwrap()
            .iter()
            .map(|u| u.id.as_i64())
            .collect();
        assert_eq!(ids, vec![9, 4, 6]);
    }

    #[test]
    fn upsert_dedupes_by_identity_not_handle() {
        let r = MemoryRoster::new();
        let chat = ChatIdent(-5);
        let mut first = user(1, "Ann");
        first.username = Some("ann".into());
        r.upsert(chat, &first).unwrap();

        // Same id, handle gone — still the same roster entry.
        r.upsert(chat, &user(1, "Ann")).unwrap();
        assert_eq!(r.audience_of(chat).unwrap().len(), 1);
    }

    #[test]
    fn attrs_survive_re_observation() {
        let r = MemoryRoster::new();
        let chat = ChatIdent(-5);
        r.upsert(chat, &user(1, "Ann")).unwrap();
        r.record_private_chat(&user(1, "Ann"), ChatIdent(100)).unwrap();
        r.set_salutation(UserIdent(1), "Annie").unwrap();

        r.upsert(chat, &user(1, "Ann")).unwrap();

        let audience = r.audience_of(chat).unwrap();
        assert_eq!(audience[0].salutation.as_deref(), Some("Annie"));
        assert_eq!(audience[0].private_chat, Some(ChatIdent(100)));
    }

    #[test]
    fn remove_is_per_chat() {
        let r = MemoryRoster::new();
        r.upsert(ChatIdent(-1), &user(1, "Ann")).unwrap();
        r.upsert(ChatIdent(-2), &user(1, "Ann")).unwrap();
        r.remove(ChatIdent(-1), UserIdent(1)).unwrap();
        assert!(r.audience_of(ChatIdent(-1)).unwrap().is_empty());
        assert_eq!(r.audience_of(ChatIdent(-2)).unwrap().len(), 1);
    }

    #[test]
    fn salutation_unknown_user_errors() {
        let r = MemoryRoster::new();
        assert!(r.set_salutation(UserIdent(404), "X").is_err());
    }
}
