//! Substitution tokens
//!
//! Host tokens such as `{contactfield=email}` are rewritten into provider placeholders
//! (`{{{ CONTACTFIELDEMAIL }}}`) and their per-recipient values into substitution data.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;

use super::Recipient;

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^A-Za-z0-9]").unwrap();
}

/// Per-recipient substitution values keyed by normalized token
pub type SubstitutionData = BTreeMap<String, String>;

/// Normalizes a raw token into a substitution key: `{contactfield=email}` becomes
/// `CONTACTFIELDEMAIL`.
pub fn normalize_token(token: &str) -> String {
    NON_ALPHANUMERIC.replace_all(token, "").to_uppercase()
}

/// The provider placeholder for a substitution key
pub fn placeholder(key: &str) -> String {
    format!("{{{{{{ {key} }}}}}}")
}

/// The set of raw tokens used across a message's recipients
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenMap {
    tokens: BTreeMap<String, String>,
}

impl TokenMap {
    /// Collects every token of every recipient
    pub fn from_recipients(recipients: &[Recipient]) -> Self {
        let tokens = recipients
            .iter()
            .flat_map(|recipient| recipient.tokens.keys())
            .filter_map(|raw| {
                let key = normalize_token(raw);
                (!key.is_empty()).then(|| (raw.clone(), key))
            })
            .collect();

        Self { tokens }
    }

    /// The normalized keys
    pub fn keys(&self) -> BTreeSet<&str> {
        self.tokens.values().map(String::as_str).collect()
    }

    /// Whether a normalized key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.tokens.values().any(|k| k == key)
    }

    /// Rewrites raw tokens in `text` into placeholders.
    ///
    /// Longer tokens go first so a token that prefixes another is not split.
    pub fn replace(&self, text: &str) -> String {
        let mut raw: Vec<(&String, &String)> = self.tokens.iter().collect();
        raw.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        raw.into_iter()
            .fold(text.to_string(), |acc, (token, key)| {
                acc.replace(token.as_str(), &placeholder(key))
            })
    }

    /// Builds a recipient's substitution data.
    ///
    /// Every key of the map is present; values the recipient lacks are empty strings.
    pub fn substitution_data(&self, recipient: &Recipient) -> SubstitutionData {
        let mut data: SubstitutionData = self
            .keys()
            .into_iter()
            .map(|key| (key.to_string(), String::new()))
            .collect();

        for (raw, value) in &recipient.tokens {
            if let Some(key) = self.tokens.get(raw) {
                let slot = data.entry(key.clone()).or_default();

                if slot.is_empty() {
                    *slot = value.clone();
                }
            }
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::mailer::{Address, EmailAddress};

    use super::*;

    fn recipient(email: &str) -> Result<Recipient, crate::domain::mailer::EmailAddressError> {
        Ok(Recipient::new(Address::from(EmailAddress::new(email)?)))
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("{contactfield=email}"), "CONTACTFIELDEMAIL");
        assert_eq!(
            normalize_token("{dynamiccontent=\"Dynamic Content 1\"}"),
            "DYNAMICCONTENTDYNAMICCONTENT1"
        );
        assert_eq!(normalize_token("{unsubscribe_text}"), "UNSUBSCRIBETEXT");
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(placeholder("TRACKINGPIXEL"), "{{{ TRACKINGPIXEL }}}");
    }

    #[test]
    fn test_replace_tokens_in_content() -> TestResult {
        let recipients = vec![recipient("contact@one.email")?
            .with_token("{contactfield=email}", "contact@one.email")
            .with_token("{unsubscribe_text}", "Unsubscribe")];

        let tokens = TokenMap::from_recipients(&recipients);

        assert_eq!(
            tokens.replace("Hello {contactfield=email}!</br>{unsubscribe_text}"),
            "Hello {{{ CONTACTFIELDEMAIL }}}!</br>{{{ UNSUBSCRIBETEXT }}}"
        );

        Ok(())
    }

    #[test]
    fn test_replace_longest_token_first() -> TestResult {
        let recipients = vec![recipient("contact@one.email")?
            .with_token("{a}", "1")
            .with_token("{a}{b}", "2")];

        let tokens = TokenMap::from_recipients(&recipients);

        assert_eq!(tokens.replace("{a}{b} {a}"), "{{{ AB }}} {{{ A }}}");

        Ok(())
    }

    #[test]
    fn test_unknown_tokens_are_left_alone() -> TestResult {
        let recipients = vec![recipient("contact@one.email")?.with_token("{subject}", "Hi")];

        let tokens = TokenMap::from_recipients(&recipients);

        assert_eq!(tokens.replace("{signature}"), "{signature}");

        Ok(())
    }

    #[test]
    fn test_substitution_data_carries_full_key_set() -> TestResult {
        let one = recipient("contact@one.email")?
            .with_token("{contactfield=email}", "contact@one.email")
            .with_token("{ownerfield=email}", "");
        let two = recipient("contact@two.email")?
            .with_token("{contactfield=email}", "contact@two.email")
            .with_token("{ownerfield=firstname}", "Owner");

        let recipients = vec![one, two];
        let tokens = TokenMap::from_recipients(&recipients);

        let data = tokens.substitution_data(&recipients[0]);

        assert_eq!(data.len(), 3);
        assert_eq!(data["CONTACTFIELDEMAIL"], "contact@one.email");
        assert_eq!(data["OWNERFIELDEMAIL"], "");
        assert_eq!(data["OWNERFIELDFIRSTNAME"], "");

        let data = tokens.substitution_data(&recipients[1]);

        assert_eq!(data["OWNERFIELDFIRSTNAME"], "Owner");
        assert_eq!(data["OWNERFIELDEMAIL"], "");

        Ok(())
    }

    #[test]
    fn test_tokens_without_alphanumerics_are_ignored() -> TestResult {
        let recipients = vec![recipient("contact@one.email")?.with_token("{}", "x")];

        let tokens = TokenMap::from_recipients(&recipients);

        assert!(tokens.keys().is_empty());
        assert_eq!(tokens.replace("{}"), "{}");

        Ok(())
    }
}
