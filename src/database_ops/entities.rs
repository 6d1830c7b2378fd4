use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde_json::Value;

/// A persisted row type with a natural lookup key.
///
/// `Filter` is what find-or-create searches by; a freshly created row is
/// initialised from it so the two can never disagree.
pub trait Entity: Clone + PartialEq + Debug {
    type Filter: Clone + Eq + Hash + Debug;

    const TABLE: &'static str;

    fn filter(&self) -> Self::Filter;

    fn from_filter(filter: &Self::Filter) -> Self;
}

/// `spy_merchant_profile`: one row per merchant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MerchantProfileRow {
    pub fk_merchant: i64,
    /// Scalar profile columns (contact person, logo, public email, ...).
    pub attributes: BTreeMap<String, Value>,
    /// Localized attribute name -> glossary key holding its translations.
    pub glossary_keys: BTreeMap<String, String>,
}

impl MerchantProfileRow {
    /// Copy every entry onto the row, overwriting existing values.
    pub fn apply_attributes<'a, I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        for (name, value) in attributes {
            self.attributes.insert(name.clone(), value.clone());
        }
    }

    pub fn set_glossary_key(&mut self, attribute: &str, key: impl Into<String>) {
        self.glossary_keys.insert(attribute.to_string(), key.into());
    }
}

impl Entity for MerchantProfileRow {
    type Filter = i64;

    const TABLE: &'static str = "spy_merchant_profile";

    fn filter(&self) -> i64 {
        self.fk_merchant
    }

    fn from_filter(fk_merchant: &i64) -> Self {
        Self {
            fk_merchant: *fk_merchant,
            ..Default::default()
        }
    }
}

/// `spy_glossary_key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryKeyRow {
    pub key: String,
    pub is_active: bool,
}

impl Entity for GlossaryKeyRow {
    type Filter = String;

    const TABLE: &'static str = "spy_glossary_key";

    fn filter(&self) -> String {
        self.key.clone()
    }

    fn from_filter(key: &String) -> Self {
        Self {
            key: key.clone(),
            is_active: true,
        }
    }
}

/// `spy_glossary_translation`: one value per (glossary key, locale).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryTranslationRow {
    pub fk_glossary_key: i64,
    pub fk_locale: i64,
    pub value: String,
}

impl Entity for GlossaryTranslationRow {
    /// (fk_glossary_key, fk_locale)
    type Filter = (i64, i64);

    const TABLE: &'static str = "spy_glossary_translation";

    fn filter(&self) -> (i64, i64) {
        (self.fk_glossary_key, self.fk_locale)
    }

    fn from_filter(&(fk_glossary_key, fk_locale): &(i64, i64)) -> Self {
        Self {
            fk_glossary_key,
            fk_locale,
            value: String::new(),
        }
    }
}

/// `spy_url`: the storefront URL of a merchant profile in one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRow {
    pub fk_resource_merchant_profile: i64,
    pub fk_locale: i64,
    pub url: String,
}

impl Entity for UrlRow {
    /// (fk_resource_merchant_profile, fk_locale)
    type Filter = (i64, i64);

    const TABLE: &'static str = "spy_url";

    fn filter(&self) -> (i64, i64) {
        (self.fk_resource_merchant_profile, self.fk_locale)
    }

    fn from_filter(&(fk_resource_merchant_profile, fk_locale): &(i64, i64)) -> Self {
        Self {
            fk_resource_merchant_profile,
            fk_locale,
            url: String::new(),
        }
    }
}
