//! Trigger detection: maps inbound text to an audience class.
//!
//! Matching is case-insensitive substring containment, so a trigger can sit
//! anywhere in a sentence ("wake up @ALL please"). The all-class aliases are
//! checked first; the two alias sets are expected to be disjoint.

use rollcall_core::config::TriggerConfig;
use rollcall_core::types::AudienceClass;

/// Configured trigger vocabulary, lowercased once at construction.
#[derive(Debug, Clone)]
pub struct TriggerSet {
    all: Vec<String>,
    admins: Vec<String>,
}

impl TriggerSet {
    /// Empty aliases are dropped — an empty needle would match every message.
    pub fn new<S: AsRef<str>>(all: &[S], admins: &[S]) -> Self {
        let lower = |aliases: &[S]| -> Vec<String> {
            aliases
                .iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect()
        };
        Self {
            all: lower(all),
            admins: lower(admins),
        }
    }

    pub fn from_config(config: &TriggerConfig) -> Self {
        Self::new(&config.all, &config.admins)
    }

    /// Which audience class `text` addresses, if any.
    pub fn classify(&self, text: &str) -> Option<AudienceClass> {
        let haystack = text.to_lowercase();
        if self.all.iter().any(|alias| haystack.contains(alias)) {
            return Some(AudienceClass::All);
        }
        if self.admins.iter().any(|alias| haystack.contains(alias)) {
            return Some(AudienceClass::Admins);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triggers() -> TriggerSet {
        TriggerSet::from_config(&TriggerConfig::default())
    }

    #[test]
    fn plain_text_is_no_trigger() {
        assert_eq!(triggers().classify("good morning"), None);
    }

    #[test]
    fn all_aliases_classify_as_all() {
        for text in ["/all", "@all", "/everyone", "@everyone"] {
            assert_eq!(triggers().classify(text), Some(AudienceClass::All), "{text}");
        }
    }

    #[test]
    fn admin_aliases_classify_as_admins() {
        for text in ["/admins", "@admins", "/administrators", "@administrators"] {
            assert_eq!(
                triggers().classify(text),
                Some(AudienceClass::Admins),
                "{text}"
            );
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(triggers().classify("Hey @ALL!"), Some(AudienceClass::All));
        assert_eq!(
            triggers().classify("/ADMINS look at this"),
            Some(AudienceClass::Admins)
        );
    }

    #[test]
    fn trigger_matches_inside_a_sentence() {
        assert_eq!(
            triggers().classify("could someone from @admins help?"),
            Some(AudienceClass::Admins)
        );
    }

    #[test]
    fn all_class_wins_when_both_match() {
        assert_eq!(
            triggers().classify("/all and /admins"),
            Some(AudienceClass::All)
        );
    }

    #[test]
    fn empty_aliases_are_ignored() {
        let set = TriggerSet::new(&["", "  "], &["/admins"]);
        assert_eq!(set.classify("anything at all"), None);
        assert_eq!(set.classify("/admins"), Some(AudienceClass::Admins));
    }
}
