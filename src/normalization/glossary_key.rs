use std::fmt;

/// Prefix used for merchant glossary keys unless configured otherwise.
pub const DEFAULT_GLOSSARY_KEY_PREFIX: &str = "merchant";

/// Glossary key holding the translations of one localized merchant attribute.
///
/// The key depends only on (prefix, attribute, merchant id), so re-importing the
/// same merchant always lands on the same glossary row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MerchantGlossaryKey {
    key: String,
}

impl MerchantGlossaryKey {
    /// Build `<prefix>.<attribute>.<id_merchant>`.
    ///
    /// Surrounding whitespace in the prefix and attribute name is dropped; an empty
    /// prefix falls back to [`DEFAULT_GLOSSARY_KEY_PREFIX`].
    pub fn new(prefix: &str, attribute: &str, id_merchant: i64) -> Self {
        let prefix = match prefix.trim() {
            "" => DEFAULT_GLOSSARY_KEY_PREFIX,
            p => p,
        };
        Self {
            key: format!("{}.{}.{}", prefix, attribute.trim(), id_merchant),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn into_string(self) -> String {
        self.key
    }
}

impl fmt::Display for MerchantGlossaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable_across_calls() {
        let a = MerchantGlossaryKey::new(DEFAULT_GLOSSARY_KEY_PREFIX, "title", 42);
        let b = MerchantGlossaryKey::new(DEFAULT_GLOSSARY_KEY_PREFIX, "title", 42);
        assert_eq!(a.as_str(), "merchant.title.42");
        assert_eq!(a, b);
    }

    #[test]
    fn distinguishes_attribute_and_merchant() {
        let title = MerchantGlossaryKey::new("merchant", "title", 42);
        assert_ne!(title, MerchantGlossaryKey::new("merchant", "description", 42));
        assert_ne!(title, MerchantGlossaryKey::new("merchant", "title", 43));
    }

    #[test]
    fn blank_prefix_falls_back_to_default() {
        let key = MerchantGlossaryKey::new("  ", " imprint_glossary_key ", 7);
        assert_eq!(key.to_string(), "merchant.imprint_glossary_key.7");
    }

    #[test]
    fn custom_prefix_is_used() {
        let key = MerchantGlossaryKey::new("marketplace", "title", 1);
        assert_eq!(key.into_string(), "marketplace.title.1");
    }
}
